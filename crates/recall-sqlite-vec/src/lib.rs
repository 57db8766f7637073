//! sqlite-vec auto-extension registration.
//!
//! Registering through `sqlite3_auto_extension` makes `vec_version()` and the
//! `vec_distance_*` functions available on every connection opened afterwards
//! in this process. Registration happens at most once; the outcome is cached.
//!
//! Setting `RECALL_SQLITE_VEC_AUTO=0` (or `false`/`off`) skips registration so
//! the store behaves like a keyword-only backend.

use std::sync::OnceLock;

/// Environment switch that disables registration.
pub const AUTO_ENABLE_ENV: &str = "RECALL_SQLITE_VEC_AUTO";

static REGISTRATION: OnceLock<Result<(), String>> = OnceLock::new();

/// Register sqlite-vec for all future connections in this process.
///
/// # Errors
///
/// Returns a description of why the extension is not registered: disabled via
/// [`AUTO_ENABLE_ENV`], or SQLite refused the auto-extension.
pub fn register_auto_extension() -> Result<(), String> {
    if disabled_by_env(std::env::var(AUTO_ENABLE_ENV).ok().as_deref()) {
        return Err(format!("sqlite-vec auto-extension disabled by {AUTO_ENABLE_ENV}"));
    }

    REGISTRATION.get_or_init(register_once).clone()
}

fn disabled_by_env(value: Option<&str>) -> bool {
    matches!(
        value.map(str::trim).map(str::to_ascii_lowercase).as_deref(),
        Some("0" | "false" | "off")
    )
}

fn register_once() -> Result<(), String> {
    #[allow(clippy::transmute_ptr_to_ptr)]
    let entrypoint: unsafe extern "C" fn(
        *mut rusqlite::ffi::sqlite3,
        *mut *const std::os::raw::c_char,
        *const rusqlite::ffi::sqlite3_api_routines,
    ) -> std::os::raw::c_int =
        unsafe { std::mem::transmute(sqlite_vec::sqlite3_vec_init as *const ()) };

    let rc = unsafe { rusqlite::ffi::sqlite3_auto_extension(Some(entrypoint)) };
    if rc == rusqlite::ffi::SQLITE_OK {
        Ok(())
    } else {
        Err(format!("sqlite3_auto_extension failed with rc={rc}"))
    }
}
