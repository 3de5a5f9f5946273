//! Configuration loading and database URL resolution

/// Default SQLite database file, used when nothing else is configured.
///
/// `mode=rwc` creates the file on first run.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://prognostic.db?mode=rwc";

/// Environment variable selecting the backing store.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Database URL resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `DATABASE_URL` environment variable
/// 3. Fixed local default (fallback)
pub fn resolve_database_url(cli_arg: Option<&str>) -> String {
    // Priority 1: Command-line argument
    if let Some(url) = cli_arg {
        if !url.is_empty() {
            return url.to_string();
        }
    }

    // Priority 2: Environment variable
    if let Ok(url) = std::env::var(DATABASE_URL_VAR) {
        if !url.is_empty() {
            return url;
        }
    }

    // Priority 3: Fixed local default
    DEFAULT_DATABASE_URL.to_string()
}
