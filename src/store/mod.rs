//! Identifier source
//!
//! The campaign consumes its identifier list as a read-once ordered
//! sequence. The primary source is a SQLite table maintained by the records
//! import pipeline; a plain-text file (one identifier per line) covers
//! ad hoc runs. The records store itself stays external to this crate:
//! nothing here writes to it.

use crate::config::PathsConfig;
use crate::Result;
use rusqlite::Connection;
use std::path::Path;

/// Loads the ordered identifier list from the configured source
///
/// Prefers the SQLite database when both sources are configured.
pub fn load_identifiers(paths: &PathsConfig) -> Result<Vec<String>> {
    if let Some(db_path) = &paths.identifier_db {
        return load_identifiers_from_db(Path::new(db_path));
    }

    if let Some(file_path) = &paths.identifier_file {
        return load_identifiers_from_file(Path::new(file_path));
    }

    // Config validation guarantees one source is set
    Ok(Vec::new())
}

/// Reads identifiers from the `subjects` table, in insertion order
pub fn load_identifiers_from_db(path: &Path) -> Result<Vec<String>> {
    let conn = Connection::open(path)?;
    let mut stmt = conn.prepare("SELECT identifier FROM subjects ORDER BY rowid")?;

    let identifiers = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<String>, rusqlite::Error>>()?;

    tracing::info!("Loaded {} identifier(s) from {}", identifiers.len(), path.display());
    Ok(identifiers)
}

/// Reads identifiers from a plain-text file, one per line
///
/// Blank lines and `#` comment lines are skipped.
pub fn load_identifiers_from_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;

    let identifiers: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    tracing::info!("Loaded {} identifier(s) from {}", identifiers.len(), path.display());
    Ok(identifiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_db_in_order() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("subjects.db");

        let conn = Connection::open(&db_path).unwrap();
        conn.execute("CREATE TABLE subjects (identifier TEXT NOT NULL)", [])
            .unwrap();
        for id in ["18240054", "27074358", "00006947"] {
            conn.execute("INSERT INTO subjects (identifier) VALUES (?1)", [id])
                .unwrap();
        }
        drop(conn);

        let identifiers = load_identifiers_from_db(&db_path).unwrap();
        assert_eq!(identifiers, vec!["18240054", "27074358", "00006947"]);
    }

    #[test]
    fn test_load_from_file_skips_blanks_and_comments() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("identifiers.txt");
        std::fs::write(&file_path, "# batch 3\n18240054\n\n  27074358  \n").unwrap();

        let identifiers = load_identifiers_from_file(&file_path).unwrap();
        assert_eq!(identifiers, vec!["18240054", "27074358"]);
    }

    #[test]
    fn test_missing_db_is_error() {
        let dir = TempDir::new().unwrap();
        // Opening creates an empty database; querying a missing table fails
        let result = load_identifiers_from_db(&dir.path().join("missing.db"));
        assert!(result.is_err());
    }

    #[test]
    fn test_prefers_db_over_file() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("subjects.db");
        let file_path = dir.path().join("identifiers.txt");

        let conn = Connection::open(&db_path).unwrap();
        conn.execute("CREATE TABLE subjects (identifier TEXT NOT NULL)", [])
            .unwrap();
        conn.execute("INSERT INTO subjects (identifier) VALUES ('11111111')", [])
            .unwrap();
        drop(conn);
        std::fs::write(&file_path, "22222222\n").unwrap();

        let paths = PathsConfig {
            identifier_db: Some(db_path.to_string_lossy().into_owned()),
            identifier_file: Some(file_path.to_string_lossy().into_owned()),
            quota_file: "q.json".to_string(),
            ledger_file: "l.json".to_string(),
        };

        assert_eq!(load_identifiers(&paths).unwrap(), vec!["11111111"]);
    }
}
