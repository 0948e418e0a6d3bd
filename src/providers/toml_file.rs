//! TOML-backed provider.
//!
//! Keys address nested tables with a separator (`.` by default), so
//! `database.pool_size` reads `pool_size` from the `[database]` table.
//!
//! Scalars are handed out as strings, exactly as written in the document
//! (`port = 8080` yields `"8080"`), and the converter registry types them.
//! Arrays become lists and tables become string-keyed maps, recursively.
//!
//! Several files can be layered: later files override earlier ones key by key,
//! nested tables merge recursively, and missing files are skipped.

use std::path::{Path, PathBuf};

use toml::Table;

use super::RawSettingsProvider;
use crate::error::FillfigError;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct TomlProvider {
    root: Table,
    separator: char,
}

impl TomlProvider {
    pub fn from_table(root: Table) -> Self {
        Self {
            root,
            separator: '.',
        }
    }

    /// Parse a TOML document held in memory.
    pub fn parse(content: &str) -> Result<Self, FillfigError> {
        parse_table(content, Path::new("<inline>")).map(Self::from_table)
    }

    /// Load a single file. A missing file is an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FillfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| FillfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        parse_table(&content, path).map(Self::from_table)
    }

    /// Layer several files, lowest priority first. Missing files are skipped;
    /// other I/O errors propagate.
    pub fn from_files<I, P>(paths: I) -> Result<Self, FillfigError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut root = Table::new();
        for path in paths {
            let path = path.as_ref();
            match std::fs::read_to_string(path) {
                Ok(content) => root = deep_merge(root, parse_table(&content, path)?),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(FillfigError::IoError {
                        path: path.to_path_buf(),
                        source: e,
                    });
                }
            }
        }
        Ok(Self::from_table(root))
    }

    /// Path of `file_name` in the platform config directory for `app_name`
    /// (e.g. `~/.config/{app_name}/{file_name}` on Linux).
    pub fn platform_path(app_name: &str, file_name: &str) -> Option<PathBuf> {
        let proj = directories::ProjectDirs::from("", "", app_name)?;
        Some(proj.config_dir().join(file_name))
    }

    /// Load `file_name` from the platform config directory. An absent
    /// directory or file yields an empty provider.
    pub fn platform(app_name: &str, file_name: &str) -> Result<Self, FillfigError> {
        Self::from_files(Self::platform_path(app_name, file_name))
    }

    /// Use `separator` between nested key segments instead of `.`.
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    fn lookup(&self, key: &str) -> Option<&toml::Value> {
        let mut segments = key.split(self.separator);
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = current.as_table()?.get(segment)?;
        }
        Some(current)
    }
}

impl RawSettingsProvider for TomlProvider {
    fn get_raw_setting(&self, key: &str) -> Result<Option<Value>, FillfigError> {
        if key.is_empty() {
            return Err(FillfigError::empty_key());
        }
        Ok(self.lookup(key).map(to_value))
    }
}

fn parse_table(content: &str, path: &Path) -> Result<Table, FillfigError> {
    toml::from_str(content).map_err(|e| FillfigError::ParseError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn to_value(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::String(i.to_string()),
        toml::Value::Float(f) => Value::String(f.to_string()),
        toml::Value::Boolean(b) => Value::String(b.to_string()),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::List(items.iter().map(to_value).collect()),
        toml::Value::Table(table) => Value::Map(
            table
                .iter()
                .map(|(k, v)| (Value::String(k.clone()), to_value(v)))
                .collect(),
        ),
    }
}

/// Overlay `overlay` on `base`. Tables present on both sides merge
/// recursively; anything else from `overlay` replaces what `base` had.
fn deep_merge(mut base: Table, overlay: Table) -> Table {
    for (key, overlay_val) in overlay {
        match (base.remove(&key), overlay_val) {
            (Some(toml::Value::Table(base_tbl)), toml::Value::Table(overlay_tbl)) => {
                base.insert(key, toml::Value::Table(deep_merge(base_tbl, overlay_tbl)));
            }
            (_, overlay_val) => {
                base.insert(key, overlay_val);
            }
        }
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DOC: &str = r#"
        name = "svc"
        port = 8080
        ratio = 0.5
        enabled = true
        tags = ["a", "b"]

        [database]
        url = "postgres://db"
        pool_size = 5

        [limits]
        read = [1, 2]
    "#;

    // --- lookup ---

    #[test]
    fn scalars_come_out_as_strings() {
        let provider = TomlProvider::parse(DOC).unwrap();
        assert_eq!(provider.get_raw_setting("name").unwrap(), Some(Value::from("svc")));
        assert_eq!(provider.get_raw_setting("port").unwrap(), Some(Value::from("8080")));
        assert_eq!(provider.get_raw_setting("ratio").unwrap(), Some(Value::from("0.5")));
        assert_eq!(provider.get_raw_setting("enabled").unwrap(), Some(Value::from("true")));
    }

    #[test]
    fn nested_key() {
        let provider = TomlProvider::parse(DOC).unwrap();
        assert_eq!(
            provider.get_raw_setting("database.pool_size").unwrap(),
            Some(Value::from("5"))
        );
        assert_eq!(provider.get_raw_setting("database.missing").unwrap(), None);
        assert_eq!(provider.get_raw_setting("name.deeper").unwrap(), None);
    }

    #[test]
    fn custom_separator() {
        let provider = TomlProvider::parse(DOC).unwrap().separator(':');
        assert_eq!(
            provider.get_raw_setting("database:url").unwrap(),
            Some(Value::from("postgres://db"))
        );
    }

    #[test]
    fn arrays_and_tables() {
        let provider = TomlProvider::parse(DOC).unwrap();
        assert_eq!(
            provider.get_raw_setting("tags").unwrap(),
            Some(Value::list(["a", "b"]))
        );
        assert_eq!(
            provider.get_raw_setting("limits").unwrap(),
            Some(Value::Map(vec![(
                Value::from("read"),
                Value::list(["1", "2"])
            )]))
        );
    }

    #[test]
    fn empty_key_rejected() {
        let provider = TomlProvider::parse(DOC).unwrap();
        assert!(matches!(
            provider.get_raw_setting(""),
            Err(FillfigError::InvalidArgument(_))
        ));
    }

    #[test]
    fn invalid_document_is_parse_error() {
        let err = TomlProvider::parse("port = ").unwrap_err();
        assert!(matches!(err, FillfigError::ParseError { .. }));
    }

    // --- files ---

    #[test]
    fn later_files_override_earlier() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("base.toml");
        let local = dir.path().join("local.toml");
        fs::write(&base, "port = 1\n[database]\nurl = \"a\"\npool_size = 5\n").unwrap();
        fs::write(&local, "[database]\npool_size = 20\n").unwrap();

        let provider = TomlProvider::from_files([&base, &local]).unwrap();
        assert_eq!(provider.get_raw_setting("port").unwrap(), Some(Value::from("1")));
        assert_eq!(
            provider.get_raw_setting("database.url").unwrap(),
            Some(Value::from("a"))
        );
        assert_eq!(
            provider.get_raw_setting("database.pool_size").unwrap(),
            Some(Value::from("20"))
        );
    }

    #[test]
    fn missing_files_skipped() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("app.toml");
        fs::write(&present, "port = 3\n").unwrap();

        let provider =
            TomlProvider::from_files([dir.path().join("absent.toml"), present]).unwrap();
        assert_eq!(provider.get_raw_setting("port").unwrap(), Some(Value::from("3")));
    }

    #[test]
    fn single_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = TomlProvider::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, FillfigError::IoError { .. }));
    }

    #[test]
    fn scalar_overlay_replaces_table() {
        let base: Table = "[database]\nurl = \"x\"\n".parse().unwrap();
        let overlay: Table = "database = \"flat\"\n".parse().unwrap();
        let merged = deep_merge(base, overlay);
        assert_eq!(merged["database"].as_str().unwrap(), "flat");
    }

    #[test]
    fn platform_path_ends_with_file_name() {
        if let Some(path) = TomlProvider::platform_path("fillfig-test", "app.toml") {
            assert!(path.ends_with("app.toml"));
        }
    }
}
