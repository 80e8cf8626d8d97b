//! SQLite schema definition.

/// Complete database schema for drug-guardian.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Application State (durable key-value entries)
-- ============================================================================

CREATE TABLE IF NOT EXISTS app_state (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                         -- JSON document
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
