// snowai-core/src/infrastructure/config/loader.rs

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::domain::reference::{ROOT_APP_CONNECTS, ROOT_APPS, ROOT_ML_OPS};
use crate::infrastructure::error::InfrastructureError;

pub const CONFIG_DIR_ENV: &str = "SNOWAI_CONFIG_DIR";
pub const DEFAULT_CONF_DIR: &str = "snowflake_ai/conf";
pub const DEFAULT_CONFIG_FILE: &str = "app_config.toml";

/// The default document shipped with the library, used when nothing else is found.
pub const BUNDLED_DOCUMENT: &str = include_str!("../../../conf/app_config.toml");

const TOML_EXTENSION: &str = "toml";
const IN_MEMORY: &str = "<memory>";

/// Where to look for configuration. Paths are explicit so discovery never
/// depends on hidden process state once the options are built.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_dir: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub current_dir: PathBuf,
    pub home_dir: Option<PathBuf>,
}

impl LoadOptions {
    /// Options built from the process: cwd, `$HOME` and `SNOWAI_CONFIG_DIR`.
    pub fn from_env() -> Result<Self, InfrastructureError> {
        let config_dir = std::env::var_os(CONFIG_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let home_dir = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            config_dir,
            config_file: None,
            current_dir: std::env::current_dir()?,
            home_dir,
        })
    }

    /// Explicit arguments override whatever `from_env` picked.
    pub fn with_overrides(mut self, config_dir: Option<PathBuf>, config_file: Option<PathBuf>) -> Self {
        if config_dir.is_some() {
            self.config_dir = config_dir;
        }
        if config_file.is_some() {
            self.config_file = config_file;
        }
        self
    }

    /// Directories probed after the custom one, in priority order.
    fn fallback_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.current_dir.join(DEFAULT_CONF_DIR)];
        if let Some(home) = &self.home_dir {
            dirs.push(home.join(DEFAULT_CONF_DIR));
        }
        dirs.push(self.current_dir.clone());
        if let Some(home) = &self.home_dir {
            dirs.push(home.clone());
        }
        dirs
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),
    Directory(PathBuf),
    Bundled,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file {}", path.display()),
            Self::Directory(path) => write!(f, "directory {}", path.display()),
            Self::Bundled => write!(f, "bundled default configuration"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub origin: ConfigOrigin,
    pub table: toml::Table,
}

// --- SINGLE SOURCES ---

pub fn load_str(text: &str) -> Result<toml::Table, InfrastructureError> {
    parse(text, Path::new(IN_MEMORY))
}

#[instrument]
pub fn load_file(path: &Path) -> Result<toml::Table, InfrastructureError> {
    if !path.is_file() {
        return Err(InfrastructureError::ConfigNotFound(
            path.display().to_string(),
        ));
    }
    let content = fs::read_to_string(path)?;
    parse(&content, path)
}

/// Merges every `*.toml` file directly inside `dir`.
///
/// Per top-level key, the most recently modified file wins; on equal
/// modification times the file whose name sorts last wins.
#[instrument]
pub fn load_dir(dir: &Path) -> Result<toml::Table, InfrastructureError> {
    if !dir.is_dir() {
        return Err(InfrastructureError::ConfigNotFound(
            dir.display().to_string(),
        ));
    }

    let mut merged = toml::Table::new();
    // normalized top-level key -> (modification time, owning file)
    let mut owners: BTreeMap<String, (SystemTime, PathBuf)> = BTreeMap::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| InfrastructureError::Io(e.into()))?;
        let path = entry.path();
        if !(entry.file_type().is_file() && has_toml_extension(path)) {
            continue;
        }

        let modified = entry
            .metadata()
            .map_err(|e| InfrastructureError::Io(e.into()))?
            .modified()?;
        let content = fs::read_to_string(path)?;
        let table = parse(&content, path)?;
        debug!(file = ?path, keys = table.len(), "Read configuration file");

        for (key, value) in table {
            let normalized = key.trim().to_lowercase();
            if let Some((stamp, owner)) = owners.get(&normalized) {
                if owner != path {
                    if modified < *stamp {
                        continue;
                    }
                    merged.retain(|k, _| k.trim().to_lowercase() != normalized);
                }
            }
            // Raw keys are kept so case variants within one file still collide
            // during document normalization.
            owners.insert(normalized, (modified, path.to_path_buf()));
            merged.insert(key, value);
        }
    }

    Ok(merged)
}

// --- DISCOVERY ---

/// Finds the configuration to use.
///
/// An explicit file wins outright. Otherwise the custom directory, then
/// `./snowflake_ai/conf`, `$HOME/snowflake_ai/conf`, the current directory and
/// `$HOME` are probed in that order; the first one holding an `apps`,
/// `app_connects` or `ml_ops` table wins. The bundled document is the last resort.
#[instrument(skip(options))]
pub fn discover(options: &LoadOptions) -> Result<LoadedDocument, InfrastructureError> {
    if let Some(file) = &options.config_file {
        let path = match &options.config_dir {
            Some(dir) if file.is_relative() => dir.join(file),
            _ => file.clone(),
        };
        let table = load_file(&path)?;
        info!(path = ?path, "Loaded configuration file");
        return Ok(LoadedDocument {
            origin: ConfigOrigin::File(path),
            table,
        });
    }

    if let Some(dir) = &options.config_dir {
        if !dir.is_dir() {
            return Err(InfrastructureError::ConfigNotFound(
                dir.display().to_string(),
            ));
        }
        let table = load_dir(dir)?;
        if has_known_root(&table) {
            info!(dir = ?dir, "Loaded configuration directory");
            return Ok(LoadedDocument {
                origin: ConfigOrigin::Directory(dir.clone()),
                table,
            });
        }
        warn!(dir = ?dir, "Custom configuration directory holds no configuration, falling back");
    }

    for dir in options.fallback_dirs() {
        if !dir.is_dir() {
            continue;
        }
        let table = load_dir(&dir)?;
        if has_known_root(&table) {
            info!(dir = ?dir, "Loaded configuration directory");
            return Ok(LoadedDocument {
                origin: ConfigOrigin::Directory(dir),
                table,
            });
        }
        debug!(dir = ?dir, "No configuration found");
    }

    info!("Using bundled default configuration");
    Ok(LoadedDocument {
        origin: ConfigOrigin::Bundled,
        table: load_str(BUNDLED_DOCUMENT)?,
    })
}

// --- HELPERS ---

fn parse(text: &str, path: &Path) -> Result<toml::Table, InfrastructureError> {
    toml::from_str(text).map_err(|source| InfrastructureError::TomlParse {
        path: path.to_path_buf(),
        source,
    })
}

fn has_toml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(TOML_EXTENSION))
}

fn has_known_root(table: &toml::Table) -> bool {
    table
        .keys()
        .map(|k| k.trim().to_lowercase())
        .any(|k| matches!(k.as_str(), ROOT_APPS | ROOT_APP_CONNECTS | ROOT_ML_OPS))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
        let path = dir.join(name);
        fs::create_dir_all(dir)?;
        fs::write(&path, content)?;
        Ok(path)
    }

    fn set_mtime(path: &Path, secs_after_epoch: u64) -> Result<()> {
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(secs_after_epoch);
        File::options().write(true).open(path)?.set_modified(time)?;
        Ok(())
    }

    fn options(current: &Path, home: &Path) -> LoadOptions {
        LoadOptions {
            config_dir: None,
            config_file: None,
            current_dir: current.to_path_buf(),
            home_dir: Some(home.to_path_buf()),
        }
    }

    #[test]
    fn test_load_dir_newest_file_wins_per_key() -> Result<()> {
        let dir = tempdir()?;
        let old = write(dir.path(), "a.toml", "[apps]\ntype = \"old\"\n[ml_ops]\nx = 1\n")?;
        let new = write(dir.path(), "b.toml", "[apps]\ntype = \"new\"\n")?;
        let older_but_later_name = write(dir.path(), "c.toml", "[ml_ops]\nx = 2\n")?;
        write(dir.path(), "notes.txt", "[apps]\ntype = \"ignored\"\n")?;
        set_mtime(&old, 2_000)?;
        set_mtime(&new, 3_000)?;
        set_mtime(&older_but_later_name, 1_000)?;

        let table = load_dir(dir.path())?;

        assert_eq!(table["apps"]["type"].as_str(), Some("new"));
        assert_eq!(table["ml_ops"]["x"].as_integer(), Some(1));
        Ok(())
    }

    #[test]
    fn test_load_dir_tie_goes_to_later_file_name() -> Result<()> {
        let dir = tempdir()?;
        let a = write(dir.path(), "a.toml", "[apps]\ntype = \"a\"\n")?;
        let b = write(dir.path(), "b.TOML", "[apps]\ntype = \"b\"\n")?;
        set_mtime(&a, 5_000)?;
        set_mtime(&b, 5_000)?;

        let table = load_dir(dir.path())?;
        assert_eq!(table["apps"]["type"].as_str(), Some("b"));
        Ok(())
    }

    #[test]
    fn test_load_dir_newer_file_replaces_case_variant() -> Result<()> {
        let dir = tempdir()?;
        let old = write(dir.path(), "a.toml", "[Apps]\ntype = \"old\"\n")?;
        let new = write(dir.path(), "b.toml", "[apps]\ntype = \"new\"\n")?;
        set_mtime(&old, 1_000)?;
        set_mtime(&new, 2_000)?;

        let table = load_dir(dir.path())?;
        assert!(!table.contains_key("Apps"));
        assert_eq!(table["apps"]["type"].as_str(), Some("new"));
        Ok(())
    }

    #[test]
    fn test_load_dir_keeps_case_variants_from_one_file() -> Result<()> {
        let dir = tempdir()?;
        write(dir.path(), "a.toml", "[Apps]\ntype = \"x\"\n[apps]\ntype = \"y\"\n")?;

        let table = load_dir(dir.path())?;
        assert_eq!(table.len(), 2);
        assert!(crate::infrastructure::config::ConfigDocument::from_table(table).is_err());
        Ok(())
    }

    #[test]
    fn test_load_dir_is_not_recursive() -> Result<()> {
        let dir = tempdir()?;
        write(&dir.path().join("nested"), "deep.toml", "[apps]\ntype = \"deep\"\n")?;
        assert!(load_dir(dir.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_error_names_the_file() -> Result<()> {
        let dir = tempdir()?;
        let path = write(dir.path(), "broken.toml", "[apps\n")?;
        match load_file(&path).unwrap_err() {
            InfrastructureError::TomlParse { path: p, .. } => assert_eq!(p, path),
            other => panic!("Expected TomlParse, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_discover_priority_order() -> Result<()> {
        let cwd = tempdir()?;
        let home = tempdir()?;
        let opts = options(cwd.path(), home.path());

        // Nothing anywhere: bundled document.
        assert_eq!(discover(&opts)?.origin, ConfigOrigin::Bundled);

        // $HOME beats the bundled document.
        write(home.path(), "app_config.toml", "[apps]\ntype = \"home\"\n")?;
        assert_eq!(
            discover(&opts)?.origin,
            ConfigOrigin::Directory(home.path().to_path_buf())
        );

        // Unrelated TOML in the current directory does not count.
        write(cwd.path(), "Cargo.toml", "[package]\nname = \"x\"\n")?;
        assert_eq!(
            discover(&opts)?.origin,
            ConfigOrigin::Directory(home.path().to_path_buf())
        );

        // $HOME/snowflake_ai/conf beats the current directory and $HOME.
        write(cwd.path(), "app_config.toml", "[apps]\ntype = \"cwd\"\n")?;
        let home_conf = home.path().join(DEFAULT_CONF_DIR);
        write(&home_conf, "app_config.toml", "[apps]\ntype = \"home_conf\"\n")?;
        assert_eq!(discover(&opts)?.origin, ConfigOrigin::Directory(home_conf));

        // ./snowflake_ai/conf beats everything but a custom directory.
        let cwd_conf = cwd.path().join(DEFAULT_CONF_DIR);
        write(&cwd_conf, "app_config.toml", "[apps]\ntype = \"cwd_conf\"\n")?;
        let found = discover(&opts)?;
        assert_eq!(found.origin, ConfigOrigin::Directory(cwd_conf));
        assert_eq!(found.table["apps"]["type"].as_str(), Some("cwd_conf"));

        let custom = tempdir()?;
        write(custom.path(), "x.toml", "[apps]\ntype = \"custom\"\n")?;
        let found = discover(&opts.clone().with_overrides(Some(custom.path().to_path_buf()), None))?;
        assert_eq!(found.table["apps"]["type"].as_str(), Some("custom"));
        Ok(())
    }

    #[test]
    fn test_discover_missing_custom_dir_is_an_error() -> Result<()> {
        let cwd = tempdir()?;
        let mut opts = options(cwd.path(), cwd.path());
        opts.config_dir = Some(cwd.path().join("does_not_exist"));

        assert!(matches!(
            discover(&opts).unwrap_err(),
            InfrastructureError::ConfigNotFound(_)
        ));
        Ok(())
    }

    #[test]
    fn test_discover_config_file_relative_to_custom_dir() -> Result<()> {
        let dir = tempdir()?;
        write(dir.path(), "prod.toml", "[apps]\ntype = \"console\"\n")?;
        let mut opts = options(dir.path(), dir.path());
        opts.config_dir = Some(dir.path().to_path_buf());
        opts.config_file = Some(PathBuf::from("prod.toml"));

        let found = discover(&opts)?;
        assert_eq!(found.origin, ConfigOrigin::File(dir.path().join("prod.toml")));
        Ok(())
    }

    #[test]
    fn test_bundled_document_parses() -> Result<()> {
        let table = load_str(BUNDLED_DOCUMENT)?;
        assert!(has_known_root(&table));
        Ok(())
    }
}
