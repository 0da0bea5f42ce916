use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ai::ValueTable;
use crate::checkpoint::metadata::CheckpointMetadata;
use crate::error::CheckpointError;
use crate::game::{canonicalize, CanonicalKey, RuleSet};

#[derive(Serialize)]
struct TableFileRef<'a> {
    metadata: &'a CheckpointMetadata,
    values: &'a ValueTable,
}

/// Keys stay as text here so a bad key is reported by name.
#[derive(Deserialize)]
struct RawTableFile {
    metadata: CheckpointMetadata,
    values: BTreeMap<String, f64>,
}

/// Sibling path the table is staged at before the rename.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write `table` to `path`, replacing any existing file atomically.
pub fn save_table(
    path: &Path,
    metadata: &CheckpointMetadata,
    table: &ValueTable,
) -> Result<(), CheckpointError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let metadata = CheckpointMetadata {
        table_size: table.len(),
        ..metadata.clone()
    };
    let json = serde_json::to_string_pretty(&TableFileRef {
        metadata: &metadata,
        values: table,
    })?;

    let tmp = tmp_path(path);
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;

    tracing::debug!(path = %path.display(), entries = table.len(), "value table saved");
    Ok(())
}

/// Read a table file and check it against `rules`.
///
/// The returned table has no pinned entries; the agent re-derives them.
pub fn load_table(
    path: &Path,
    rules: RuleSet,
) -> Result<(CheckpointMetadata, ValueTable), CheckpointError> {
    let json = fs::read_to_string(path).map_err(|e| CheckpointError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let raw: RawTableFile = serde_json::from_str(&json).map_err(|e| CheckpointError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    if !raw.metadata.matches(rules) {
        return Err(CheckpointError::ShapeMismatch {
            expected: rules.label(),
            found: raw.metadata.board.clone(),
        });
    }

    let mut table = ValueTable::new();
    for (text, value) in raw.values {
        let key: CanonicalKey = text.parse().map_err(|reason| CheckpointError::InvalidKey {
            key: text.clone(),
            reason,
        })?;
        let board = key.to_board(rules).map_err(|e| CheckpointError::InvalidKey {
            key: text.clone(),
            reason: e.to_string(),
        })?;
        if canonicalize(&board) != key {
            return Err(CheckpointError::InvalidKey {
                key: text,
                reason: "not in canonical form".to_string(),
            });
        }
        table.set(key, value);
    }

    tracing::debug!(path = %path.display(), entries = table.len(), "value table loaded");
    Ok((raw.metadata, table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{RlAgent, RlConfig};
    use crate::checkpoint::CheckpointStats;
    use crate::engine::GameEngine;
    use crate::game::Board;
    use tempfile::TempDir;

    fn trained_table(rules: RuleSet, episodes: usize) -> ValueTable {
        let config = RlConfig {
            seed: Some(3),
            ..RlConfig::default()
        };
        let mut agent = RlAgent::new(config, rules);
        let mut engine = GameEngine::new(rules);
        for _ in 0..episodes {
            let (outcome, record) = engine.run_self_play(&mut agent).unwrap();
            agent.update(&record, outcome);
        }
        agent.into_table()
    }

    fn metadata(rules: RuleSet) -> CheckpointMetadata {
        CheckpointMetadata::new(42, rules, &RlConfig::default(), CheckpointStats::default())
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("table.json");
        let rules = RuleSet::tic_tac_toe();
        let table = trained_table(rules, 200);

        save_table(&path, &metadata(rules), &table).unwrap();
        let (meta, loaded) = load_table(&path, rules).unwrap();

        assert_eq!(loaded, table);
        for (key, value) in table.iter() {
            assert_eq!(loaded.get(key).unwrap().to_bits(), value.to_bits());
        }
        assert_eq!(meta.episode, 42);
        assert_eq!(meta.board, "3x3k3");
        assert_eq!(meta.table_size, table.len());
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn test_values_written_in_key_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("table.json");
        let rules = RuleSet::tic_tac_toe();
        let table = trained_table(rules, 20);
        save_table(&path, &metadata(rules), &table).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let positions: Vec<usize> = table
            .keys()
            .map(|k| text.find(&format!("\"{k}\"")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("table.json");
        let rules = RuleSet::tic_tac_toe();

        save_table(&path, &metadata(rules), &ValueTable::new()).unwrap();
        let table = trained_table(rules, 10);
        save_table(&path, &metadata(rules), &table).unwrap();

        let (_, loaded) = load_table(&path, rules).unwrap();
        assert_eq!(loaded.len(), table.len());
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("table.json");
        let rules = RuleSet::tic_tac_toe();
        save_table(&path, &metadata(rules), &ValueTable::new()).unwrap();

        let other = RuleSet::new(4, 4, 3).unwrap();
        let err = load_table(&path, other).unwrap_err();
        assert!(matches!(err, CheckpointError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_invalid_key_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("table.json");
        let rules = RuleSet::tic_tac_toe();
        let meta = serde_json::to_value(metadata(rules)).unwrap();
        let doc = serde_json::json!({ "metadata": meta, "values": { "XQX/.../...": 0.5 } });
        fs::write(&path, doc.to_string()).unwrap();

        let err = load_table(&path, rules).unwrap_err();
        match err {
            CheckpointError::InvalidKey { key, .. } => assert_eq!(key, "XQX/.../..."),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unreachable_key_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("table.json");
        let rules = RuleSet::tic_tac_toe();
        let meta = serde_json::to_value(metadata(rules)).unwrap();
        // three O and no X cannot arise from alternating play
        let doc = serde_json::json!({ "metadata": meta, "values": { "OOO/.../...": 0.5 } });
        fs::write(&path, doc.to_string()).unwrap();

        assert!(matches!(
            load_table(&path, rules).unwrap_err(),
            CheckpointError::InvalidKey { .. }
        ));
    }

    #[test]
    fn test_non_canonical_key_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("table.json");
        let rules = RuleSet::tic_tac_toe();
        let meta = serde_json::to_value(metadata(rules)).unwrap();
        // one of the four single-corner boards is the canonical one
        let corner = ["X../.../...", "..X/.../...", ".../.../X..", ".../.../..X"]
            .into_iter()
            .find(|text| {
                let board = Board::parse(rules, text).unwrap();
                canonicalize(&board).to_string() != *text
            })
            .unwrap();
        let mut values = serde_json::Map::new();
        values.insert(corner.to_string(), serde_json::json!(0.5));
        let doc = serde_json::json!({ "metadata": meta, "values": values });
        fs::write(&path, doc.to_string()).unwrap();

        match load_table(&path, rules).unwrap_err() {
            CheckpointError::InvalidKey { key, reason } => {
                assert_eq!(key, corner);
                assert_eq!(reason, "not in canonical form");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_and_corrupt_files() {
        let tmp = TempDir::new().unwrap();
        let rules = RuleSet::tic_tac_toe();

        let missing = tmp.path().join("absent.json");
        assert!(matches!(
            load_table(&missing, rules).unwrap_err(),
            CheckpointError::Read { .. }
        ));

        let corrupt = tmp.path().join("corrupt.json");
        fs::write(&corrupt, "{ not json").unwrap();
        assert!(matches!(
            load_table(&corrupt, rules).unwrap_err(),
            CheckpointError::Parse { .. }
        ));
    }

    #[test]
    fn test_loaded_table_is_repinned_by_agent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("table.json");
        let rules = RuleSet::tic_tac_toe();
        let table = trained_table(rules, 100);
        save_table(&path, &metadata(rules), &table).unwrap();

        let (_, loaded) = load_table(&path, rules).unwrap();
        assert_eq!(loaded.pinned_count(), 0);
        let agent = RlAgent::with_table(RlConfig::default(), rules, loaded);
        let win = canonicalize(&Board::parse(rules, "XXX/OO./...").unwrap());
        if agent.table().contains(&win) {
            assert!(agent.table().is_pinned(&win));
        }
        assert!(agent.table().pinned_count() > 0);
    }
}
