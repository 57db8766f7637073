//! Canonical SQLite schema for a recall memory store.
//!
//! - `memories` holds one row per remembered fact, its condensed "pyramid"
//!   form, and an optional little-endian f32 `embedding` BLOB
//! - `memories_fts` is an external-content FTS5 index over title, summary,
//!   and content, kept in sync by triggers
//! - `startup` holds the small identity/context snippets returned verbatim
//! - `store_meta` mirrors `PRAGMA user_version` for tools that cannot read it

/// Migration v1: memories, startup snippets, FTS5 index, store metadata.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL,
    created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER))
);

INSERT OR IGNORE INTO store_meta (id, schema_version) VALUES (1, 0);

CREATE TABLE IF NOT EXISTS startup (
    key TEXT PRIMARY KEY,
    content TEXT,
    priority INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS memories (
    id INTEGER PRIMARY KEY,
    title TEXT,
    summary TEXT,
    content TEXT,
    content_pyramid TEXT,
    category TEXT,
    source_file TEXT,
    embedding BLOB
);

CREATE VIRTUAL TABLE IF NOT EXISTS memories_fts USING fts5(
    title,
    summary,
    content,
    content='memories',
    content_rowid='id',
    tokenize='porter unicode61',
    prefix='2 3'
);

CREATE TRIGGER IF NOT EXISTS memories_ai
AFTER INSERT ON memories
BEGIN
    INSERT INTO memories_fts(rowid, title, summary, content)
    VALUES (new.id, new.title, new.summary, new.content);
END;

CREATE TRIGGER IF NOT EXISTS memories_au
AFTER UPDATE OF title, summary, content ON memories
BEGIN
    INSERT INTO memories_fts(memories_fts, rowid, title, summary, content)
    VALUES ('delete', old.id, old.title, old.summary, old.content);

    INSERT INTO memories_fts(rowid, title, summary, content)
    VALUES (new.id, new.title, new.summary, new.content);
END;

CREATE TRIGGER IF NOT EXISTS memories_ad
AFTER DELETE ON memories
BEGIN
    INSERT INTO memories_fts(memories_fts, rowid, title, summary, content)
    VALUES ('delete', old.id, old.title, old.summary, old.content);
END;
";

/// Migration v2: temporal validity columns and filter indexes.
pub const MIGRATION_V2_SQL: &str = r"
ALTER TABLE memories ADD COLUMN superseded_by INTEGER;
ALTER TABLE memories ADD COLUMN valid_to INTEGER;

CREATE INDEX IF NOT EXISTS idx_memories_category
    ON memories(category);

CREATE INDEX IF NOT EXISTS idx_memories_active
    ON memories(superseded_by, valid_to);

CREATE INDEX IF NOT EXISTS idx_startup_priority
    ON startup(priority, key);
";

/// Indexes expected by the filtered retrieval paths.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_memories_category",
    "idx_memories_active",
    "idx_startup_priority",
];
