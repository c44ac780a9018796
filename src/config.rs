//! User configuration (`config.toml`).
//!
//! A missing file is not an error. Every problem with a present file is
//! returned as a warning and the built-in defaults are used instead.

use directories::ProjectDirs;
use ordergrid_core::document::PICKUP_DATE_FORMAT;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 65_536; // 64 KiB

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    rows_per_order: Option<usize>,
    date_format: Option<String>,
    log_filter: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Rows an imported order occupies when `import` is given no count
    pub rows_per_order: usize,
    /// chrono format for the import date in column B
    pub date_format: String,
    /// tracing filter directive, used when `ORDERGRID_LOG` is unset
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rows_per_order: 1,
            date_format: PICKUP_DATE_FORMAT.to_string(),
            log_filter: None,
        }
    }
}

impl Config {
    fn apply(&mut self, file: ConfigFile, path: &Path, warnings: &mut Vec<String>) {
        match file.rows_per_order {
            Some(0) => warnings.push(format!(
                "{}: rows_per_order must be at least 1, using {}",
                path.display(),
                self.rows_per_order
            )),
            Some(n) => self.rows_per_order = n,
            None => {}
        }
        match file.date_format {
            Some(f) if f.trim().is_empty() => warnings.push(format!(
                "{}: date_format is empty, using {}",
                path.display(),
                self.date_format
            )),
            Some(f) => self.date_format = f,
            None => {}
        }
        if let Some(filter) = file.log_filter.filter(|f| !f.trim().is_empty()) {
            self.log_filter = Some(filter);
        }
    }
}

/// Load the config from `config_file`, or from the user config dir.
pub fn load_config(config_file: Option<&PathBuf>) -> (Config, Vec<String>) {
    let mut config = Config::default();
    let mut warnings: Vec<String> = Vec::new();

    let Some(path) = config_file.cloned().or_else(user_config_path) else {
        return (config, warnings);
    };
    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (config, warnings);
    }

    match std::fs::metadata(&path) {
        Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
            warnings.push(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_CONFIG_FILE_BYTES
            ));
        }
        Ok(_) => match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<ConfigFile>(&content) {
                Ok(parsed) => config.apply(parsed, &path, &mut warnings),
                Err(err) => warnings.push(format!("Failed to parse {}: {}", path.display(), err)),
            },
            Err(err) => warnings.push(format!("Failed to read {}: {}", path.display(), err)),
        },
        Err(err) => warnings.push(format!(
            "Failed to read metadata for {}: {}",
            path.display(),
            err
        )),
    }

    (config, warnings)
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "ordergrid")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
