//! E2E tests for `recall init` / `search` / `startup` / `status`.

use assert_cmd::Command;
use predicates::prelude::*;
use rusqlite::{Connection, params};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A temp dir holding a config with no embedding provider, so nothing tries
/// to reach a network service.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        fs::write(
            dir.path().join("config.toml"),
            "[embedding]\nprovider = \"none\"\n",
        )
        .expect("write config");
        Self { dir }
    }

    fn store(&self) -> PathBuf {
        self.dir.path().join("recall.db")
    }

    fn db_url(&self) -> String {
        format!("sqlite://{}", self.store().display())
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("recall"));
        cmd.current_dir(self.dir.path());
        cmd.env("RECALL_LOG", "error");
        cmd.env_remove("RECALL_DB");
        cmd.env_remove("RECALL_BACKEND");
        cmd.args([
            "--config",
            &self.dir.path().join("config.toml").display().to_string(),
            "--db",
            &self.db_url(),
        ]);
        cmd
    }

    fn init(&self) {
        self.cmd().arg("init").assert().success();
    }

    fn seed(&self) {
        let conn = Connection::open(self.store()).expect("open store");
        insert(&conn, 1, "Deploy checklist", "Run migrations before the deploy.", "ops");
        insert(&conn, 2, "Postgres tuning", "shared_buffers at a quarter of RAM.", "infra");
        insert(&conn, 3, "Deploy rollback", "Rollback by redeploying the previous tag.", "ops");
        conn.execute(
            "UPDATE memories SET content_pyramid = 'Migrate, then deploy.' WHERE id = 1",
            [],
        )
        .expect("pyramid");
        conn.execute(
            "INSERT INTO startup (key, content, priority) VALUES ('identity', 'Ops assistant.', 0)",
            [],
        )
        .expect("startup");
    }

    fn search_json(&self, extra: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(["search", "--json"])
            .args(extra)
            .output()
            .expect("search should not crash");
        assert!(
            output.status.success(),
            "search failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("valid JSON")
    }
}

fn insert(conn: &Connection, id: i64, title: &str, content: &str, category: &str) {
    conn.execute(
        "INSERT INTO memories (id, title, content, category, source_file) VALUES (?1, ?2, ?3, ?4, 'notes.md')",
        params![id, title, content, category],
    )
    .expect("insert memory");
}

fn ids(response: &Value) -> Vec<String> {
    response["results"]
        .as_array()
        .expect("results array")
        .iter()
        .map(|r| r["id"].as_str().expect("id").to_string())
        .collect()
}

#[test]
fn init_creates_store_and_is_rerunnable() {
    let ws = Workspace::new();

    let out = ws.cmd().args(["init", "--json"]).output().expect("init");
    assert!(out.status.success());
    let first: Value = serde_json::from_slice(&out.stdout).expect("json");
    assert_eq!(first["created"], true);
    assert_eq!(first["schema_version"], 2);
    assert!(ws.store().is_file());

    let out = ws.cmd().args(["init", "--json"]).output().expect("init again");
    let second: Value = serde_json::from_slice(&out.stdout).expect("json");
    assert_eq!(second["created"], false);
}

#[test]
fn search_returns_envelope_with_ranked_results() {
    let ws = Workspace::new();
    ws.init();
    ws.seed();

    let response = ws.search_json(&["deploy"]);
    assert_eq!(response["query"], "deploy");
    assert_eq!(response["count"], 2);
    let found = ids(&response);
    assert_eq!(found.len(), 2);
    assert!(found.contains(&"1".to_string()));
    assert!(found.contains(&"3".to_string()));
    assert!(response.get("report").is_none());
    assert!(response["results"][0].get("lexical_rank").is_none());
}

#[test]
fn search_summary_and_full_content() {
    let ws = Workspace::new();
    ws.init();
    ws.seed();

    let summary = ws.search_json(&["migrations"]);
    assert_eq!(summary["results"][0]["content"], "Migrate, then deploy.");

    let full = ws.search_json(&["migrations", "--full"]);
    assert_eq!(
        full["results"][0]["content"],
        "Run migrations before the deploy."
    );
}

#[test]
fn search_category_and_limit() {
    let ws = Workspace::new();
    ws.init();
    ws.seed();

    let infra = ws.search_json(&["deploy OR postgres", "--category", "infra"]);
    assert_eq!(ids(&infra), vec!["2"]);

    let limited = ws.search_json(&["deploy", "-n", "1"]);
    assert_eq!(limited["count"], 1);
}

#[test]
fn explain_reports_skipped_vector_leg() {
    let ws = Workspace::new();
    ws.init();
    ws.seed();

    let response = ws.search_json(&["deploy", "--explain"]);
    assert_eq!(response["report"]["lexical_mode"], "ranked");
    assert_eq!(response["report"]["vector"]["status"], "skipped");
    assert_eq!(response["report"]["vector"]["reason"], "no_embedder");
    assert_eq!(response["results"][0]["lexical_rank"], 0);
}

#[test]
fn malformed_query_falls_back_to_substring() {
    let ws = Workspace::new();
    ws.init();
    ws.seed();

    let response = ws.search_json(&["shared_buffers AND", "--explain"]);
    assert_eq!(response["report"]["lexical_mode"], "substring");
    assert_eq!(ids(&response), Vec::<String>::new());

    let response = ws.search_json(&["\"Rollback", "--explain"]);
    assert_eq!(response["report"]["lexical_mode"], "substring");
}

#[test]
fn empty_query_rejected_before_store_access() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["search", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E3003"))
        .stderr(predicate::str::contains("search query must not be empty"));

    assert!(!ws.store().exists(), "store must not be created");
}

#[test]
fn missing_store_is_unreachable_error() {
    let ws = Workspace::new();

    let output = ws
        .cmd()
        .args(["--json", "search", "deploy"])
        .output()
        .expect("run");
    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stderr).expect("json error");
    assert_eq!(err["error"]["error_code"], "E2001");
    assert!(!ws.store().exists());
}

#[test]
fn unsupported_backend_url_is_config_error() {
    let ws = Workspace::new();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("recall"));
    cmd.env("RECALL_LOG", "error")
        .args([
            "--config",
            &ws.dir.path().join("config.toml").display().to_string(),
            "--db",
            "postgresql://localhost/recall",
            "status",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1004"));
}

#[test]
fn startup_prints_identity_text() {
    let ws = Workspace::new();
    ws.init();
    ws.seed();

    ws.cmd()
        .arg("startup")
        .assert()
        .success()
        .stdout("Ops assistant.\n");
}

#[test]
fn status_reports_capabilities() {
    let ws = Workspace::new();
    ws.init();

    let output = ws.cmd().args(["status", "--json"]).output().expect("status");
    assert!(output.status.success());
    let status: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(status["reachable"], true);
    assert_eq!(status["schema_version"], 2);

    let caps = status["capabilities"].as_array().expect("capabilities");
    let available = |name: &str| {
        caps.iter()
            .find(|c| c["name"] == name)
            .map(|c| c["available"].clone())
    };
    assert_eq!(available("fts5"), Some(Value::Bool(true)));
    assert_eq!(available("embedding_column"), Some(Value::Bool(true)));
    assert_eq!(available("embedding_service"), Some(Value::Bool(false)));
}

#[test]
fn status_on_missing_store_still_succeeds() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("reachable:         no"));
}
