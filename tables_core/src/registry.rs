use crate::config::TableFileConfig;
use crate::draw::TableDraw;
use crate::table::RollTable;
use crate::{ConfigError, RollError};
use rand::Rng;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Id of the bundled panic table
pub const PANIC_TABLE_ID: &str = "panic";

const PANIC_TABLE: &str = include_str!("../tables/panic.toml");

/// Registry of roll tables, loaded from TOML files
#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: HashMap<String, RollTable>,
}

impl TableRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the bundled tables
    pub fn with_defaults() -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        registry.load_str(PANIC_TABLE, Path::new("tables/panic.toml"))?;
        Ok(registry)
    }

    /// Load all roll tables from a directory (recursively)
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        registry.load_dir(dir)?;
        Ok(registry)
    }

    /// Load tables from a directory recursively, replacing tables with the same id
    pub fn load_dir(&mut self, dir: &Path) -> Result<(), ConfigError> {
        if !dir.exists() {
            return Ok(());
        }

        let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(dir.to_path_buf()),
        })?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ConfigError::Io {
                error: e,
                path: Some(dir.to_path_buf()),
            })?;
            paths.push(entry.path());
        }
        paths.sort();

        for path in paths {
            if path.is_dir() {
                self.load_dir(&path)?;
            } else if path.extension().is_some_and(|ext| ext == "toml") {
                self.load_file(&path)?;
            }
        }

        Ok(())
    }

    /// Load a single table file
    pub fn load_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(path.to_path_buf()),
        })?;
        self.load_str(&content, path)
    }

    fn load_str(&mut self, content: &str, path: &Path) -> Result<(), ConfigError> {
        let config: TableFileConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            error: e,
            path: path.to_path_buf(),
        })?;

        let table = RollTable::from_config(config).map_err(|e| ConfigError::Validation {
            message: e.to_string(),
            path: path.to_path_buf(),
        })?;

        tracing::debug!(table = %table.id, path = %path.display(), "Loaded roll table");
        self.insert(table);
        Ok(())
    }

    pub fn insert(&mut self, table: RollTable) {
        self.tables.insert(table.id.clone(), table);
    }

    /// Get a table by ID
    pub fn get(&self, id: &str) -> Option<&RollTable> {
        self.tables.get(id)
    }

    /// Get a table by its display name, the way rules text refers to tables
    pub fn get_by_name(&self, name: &str) -> Option<&RollTable> {
        self.tables.values().find(|t| t.name == name)
    }

    /// Check if a table exists
    pub fn contains(&self, id: &str) -> bool {
        self.tables.contains_key(id)
    }

    /// List all table IDs
    pub fn table_ids(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|s| s.as_str())
    }

    /// Roll a table by ID or display name
    pub fn roll<R: Rng>(
        &self,
        table: &str,
        modifier: i64,
        rng: &mut R,
    ) -> Result<TableDraw, RollError> {
        Ok(self.resolve(table)?.roll(modifier, rng))
    }

    /// Draw from a table with dice already rolled
    pub fn draw_with(
        &self,
        table: &str,
        dice: Vec<u32>,
        modifier: i64,
    ) -> Result<TableDraw, RollError> {
        Ok(self.resolve(table)?.draw_with(dice, modifier))
    }

    fn resolve(&self, table: &str) -> Result<&RollTable, RollError> {
        self.get(table)
            .or_else(|| self.get_by_name(table))
            .ok_or_else(|| RollError::UnknownTable(table.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_table(dir: &Path, name: &str, content: &str) {
        let path = dir.join(format!("{}.toml", name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    const BITES: &str = r#"
[table]
id = "xeno_bites"
name = "Drone Attacks"

[[entries]]
range = [1, 3]
text = "Tail lash"

[[entries]]
range = [4, 6]
text = "Inner jaw"
"#;

    #[test]
    fn test_load_simple_table() {
        let dir = TempDir::new().unwrap();
        create_test_table(dir.path(), "bites", BITES);

        let registry = TableRegistry::load(dir.path()).unwrap();
        assert!(registry.contains("xeno_bites"));
        assert_eq!(registry.get_by_name("Drone Attacks").unwrap().id, "xeno_bites");
    }

    #[test]
    fn test_load_nested_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("creatures");
        std::fs::create_dir(&nested).unwrap();
        create_test_table(&nested, "bites", BITES);
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let registry = TableRegistry::load(dir.path()).unwrap();
        assert_eq!(registry.table_ids().count(), 1);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let registry = TableRegistry::load(&dir.path().join("absent")).unwrap();
        assert_eq!(registry.table_ids().count(), 0);
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        create_test_table(dir.path(), "broken", "[table\nid = ");

        let err = TableRegistry::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if path.ends_with("broken.toml")));
    }

    #[test]
    fn test_validation_error() {
        let dir = TempDir::new().unwrap();
        create_test_table(
            dir.path(),
            "bad",
            r#"
[table]
id = "bad"

[[entries]]
range = [6, 1]
text = "never"
"#,
        );

        let err = TableRegistry::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_roll_by_name_with_seed() {
        let dir = TempDir::new().unwrap();
        create_test_table(dir.path(), "bites", BITES);
        let registry = TableRegistry::load(dir.path()).unwrap();

        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        let first = registry.roll("Drone Attacks", 0, &mut a).unwrap();
        let second = registry.roll("xeno_bites", 0, &mut b).unwrap();
        assert_eq!(first, second);
        assert!(first.entry.is_some());
    }

    #[test]
    fn test_unknown_table_error() {
        let registry = TableRegistry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = registry.roll("nonexistent", 0, &mut rng);
        assert!(matches!(result, Err(RollError::UnknownTable(_))));
    }

    #[test]
    fn test_default_panic_table() {
        let registry = TableRegistry::with_defaults().unwrap();
        let table = registry.get_by_name("Panic Table").unwrap();
        assert_eq!(table.id, PANIC_TABLE_ID);

        let calm = registry.draw_with(PANIC_TABLE_ID, vec![3], 2).unwrap();
        assert_eq!(calm.entry.unwrap().key.as_deref(), Some("ALIENRPG.Panic1"));

        let freeze = registry.draw_with(PANIC_TABLE_ID, vec![4], 6).unwrap();
        assert_eq!(freeze.entry.unwrap().key.as_deref(), Some("ALIENRPG.Panic10"));

        let off_the_chart = registry.draw_with(PANIC_TABLE_ID, vec![6], 14).unwrap();
        assert_eq!(
            off_the_chart.entry.unwrap().key.as_deref(),
            Some("ALIENRPG.Panic15")
        );
    }

    #[test]
    fn test_low_total_clamps_to_first_entry() {
        let registry = TableRegistry::with_defaults().unwrap();
        let draw = registry.draw_with(PANIC_TABLE_ID, vec![1], -4).unwrap();
        assert_eq!(draw.total, -3);
        assert_eq!(draw.entry.unwrap().key.as_deref(), Some("ALIENRPG.Panic1"));
    }

    #[test]
    fn test_later_file_replaces_table() {
        let dir = TempDir::new().unwrap();
        create_test_table(dir.path(), "a", BITES);
        create_test_table(
            dir.path(),
            "b",
            r#"
[table]
id = "xeno_bites"

[[entries]]
range = [1, 6]
text = "Headbite"
"#,
        );

        let registry = TableRegistry::load(dir.path()).unwrap();
        assert_eq!(registry.get("xeno_bites").unwrap().entries().len(), 1);
    }
}
