//! # mediaitem configuration
//!
//! Configuration management for the mediaitem tools:
//! - Loading configuration from a YAML file
//! - Merging with the embedded default configuration
//! - Environment variable overrides
//! - Typed getters and setters
//!
//! ## Usage
//!
//! ```no_run
//! use mediaconfig::Config;
//!
//! let config = Config::load_config("")?;
//! let format = config.get_output_format();
//! config.set_audio_only(true)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Result, anyhow};
use dirs::home_dir;
use serde_yaml::{Mapping, Value};
use std::{env, fs, path::Path, sync::Mutex};
use tracing::{debug, info, warn};

const DEFAULT_CONFIG: &str = include_str!("mediaitem.yaml");

const ENV_CONFIG_DIR: &str = "MEDIAITEM_CONFIG";
const ENV_PREFIX: &str = "MEDIAITEM_CONFIG__";
const CONFIG_DIR_NAME: &str = ".mediaitem";

const DEFAULT_OUTPUT_FORMAT: &str = "markdown";
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
const DEFAULT_AUDIO_ONLY: bool = false;

/// Generates getter/setter for bool values with default
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> bool {
            match self.get_value($path) {
                Ok(Value::Bool(b)) => b,
                _ => $default,
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Generates getter/setter for string values with default
macro_rules! impl_string_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> String {
            match self.get_value($path) {
                Ok(Value::String(s)) if !s.trim().is_empty() => s,
                Ok(_) => {
                    warn!(path = %$path.join("."), "Not a string, using default {}", $default);
                    $default.to_string()
                }
                Err(_) => $default.to_string(),
            }
        }

        pub fn $setter(&self, value: &str) -> Result<()> {
            self.set_value($path, Value::String(value.to_string()))
        }
    };
}

/// Configuration manager
///
/// Holds the merged YAML tree and the path of the file it is saved to.
/// A configuration built by [`Config::load_defaults`] has no file and lives
/// in memory only.
#[derive(Debug)]
pub struct Config {
    config_dir: Option<String>,
    path: Option<String>,
    data: Mutex<Value>,
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Current directory
        if Path::new(CONFIG_DIR_NAME).exists() {
            return CONFIG_DIR_NAME.to_string();
        }

        // 4. Home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        CONFIG_DIR_NAME.to_string()
    }

    /// Creates the directory if needed and checks it is readable and writable
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!("{} is not a directory", path.display()));
        }

        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        fs::read_dir(path)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// Search order:
    /// 1. `directory` when not empty
    /// 2. the `MEDIAITEM_CONFIG` environment variable
    /// 3. `.mediaitem` in the current directory
    /// 4. `.mediaitem` in the user's home directory
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir_path = Self::find_config_dir(directory);
        Self::validate_config_dir(Path::new(&dir_path))?;
        Ok(dir_path)
    }

    /// Config directory found by the search order, only if it already exists
    pub fn existing_config_dir() -> Option<String> {
        let dir = Self::find_config_dir("");
        Path::new(&dir).is_dir().then_some(dir)
    }

    /// Loads the configuration
    ///
    /// 1. Determines the configuration directory
    /// 2. Loads the embedded default configuration
    /// 3. Merges `config.yaml` from that directory when present
    /// 4. Applies `MEDIAITEM_CONFIG__SECTION__KEY` environment overrides
    /// 5. Saves the merged configuration
    pub fn load_config(directory: &str) -> Result<Self> {
        Self::load_with_overrides(directory, env::vars())
    }

    fn load_with_overrides<I>(directory: &str, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir = %config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        let mut config_value = Self::lower_keys_value(serde_yaml::from_str(DEFAULT_CONFIG)?);

        let yaml_data = if let Ok(data) = fs::read(&path) {
            info!(config_file = %path, "Loaded config file");
            data
        } else {
            info!(config_file = %path, "Config file not found, using default embedded config");
            DEFAULT_CONFIG.as_bytes().to_vec()
        };

        // Keys are lowered on both sides so `Inspect` in a file overrides `inspect`
        let external_value = Self::lower_keys_value(serde_yaml::from_slice(&yaml_data)?);
        // An empty file parses as null
        if !external_value.is_null() {
            merge_yaml(&mut config_value, &external_value);
        }

        Self::apply_env_overrides(&mut config_value, vars);

        let config = Config {
            config_dir: Some(config_dir),
            path: Some(path),
            data: Mutex::new(config_value),
        };

        config.save()?;
        Ok(config)
    }

    /// Embedded defaults plus environment overrides, without touching the
    /// filesystem. Setters only change the in-memory tree.
    pub fn load_defaults() -> Result<Self> {
        Self::defaults_with_overrides(env::vars())
    }

    fn defaults_with_overrides<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config_value = Self::lower_keys_value(serde_yaml::from_str(DEFAULT_CONFIG)?);
        Self::apply_env_overrides(&mut config_value, vars);

        Ok(Config {
            config_dir: None,
            path: None,
            data: Mutex::new(config_value),
        })
    }

    pub fn dir(&self) -> Option<&str> {
        self.config_dir.as_deref()
    }

    pub fn file_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Value>> {
        self.data
            .lock()
            .map_err(|_| anyhow!("Configuration mutex poisoned"))
    }

    /// Writes the current configuration to `config.yaml`; no-op without a file
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            debug!("In-memory configuration, nothing to save");
            return Ok(());
        };
        let yaml = serde_yaml::to_string(&*self.lock()?)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    /// Sets a value at `path` (e.g. `&["inspect", "format"]`) and saves
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.lock()?;
            Self::set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key_value = Value::String(path[0].to_lowercase());
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets the value at `path`; errors when the path does not exist
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.lock()?;
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                match map.get(&Value::String(key.to_lowercase())) {
                    Some(next) => current = next,
                    None => return Err(anyhow!("Path {} does not exist", path[..=i].join("."))),
                }
            } else {
                return Err(anyhow!("Path {} is not a map", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    fn apply_env_overrides<I>(config: &mut Value, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let key_path = stripped.split("__").collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                if let Err(err) = Self::set_value_internal(config, &key_path, yaml_value) {
                    warn!(env_var = %key, error = %err, "Ignoring config override");
                }
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    let key = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    new_map.insert(key, Self::lower_keys_value(v));
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    impl_string_config!(
        get_output_format,
        set_output_format,
        &["inspect", "format"],
        DEFAULT_OUTPUT_FORMAT
    );

    impl_string_config!(
        get_log_min_level,
        set_log_min_level,
        &["logger", "min_level"],
        DEFAULT_LOG_MIN_LEVEL
    );

    impl_bool_config!(
        get_audio_only,
        set_audio_only,
        &["inspect", "audio_only"],
        DEFAULT_AUDIO_ONLY
    );

    /// MIME types tried in order when picking the resource to show first
    pub fn get_preferred_mime_types(&self) -> Vec<String> {
        match self.get_value(&["inspect", "preferred_mime_types"]) {
            Ok(Value::Sequence(seq)) => seq
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            // A single value set through the environment
            Ok(Value::String(s)) => s
                .split(',')
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn set_preferred_mime_types(&self, mime_types: &[&str]) -> Result<()> {
        let seq = mime_types
            .iter()
            .map(|m| Value::String(m.to_string()))
            .collect();
        self.set_value(&["inspect", "preferred_mime_types"], Value::Sequence(seq))
    }
}

/// Recursively merges `src` into `dst`; `src` wins on conflicts
fn merge_yaml(dst: &mut Value, src: &Value) {
    match (dst, src) {
        (Value::Mapping(dst_map), Value::Mapping(src_map)) => {
            for (k, v) in src_map {
                match dst_map.get_mut(k) {
                    Some(dst_v) => merge_yaml(dst_v, v),
                    None => {
                        dst_map.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (dst, src) => {
            *dst = src.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_merge_yaml_overrides_leaves() {
        let mut dst: Value = serde_yaml::from_str("a: {b: 1, c: 2}\nd: x").unwrap();
        let src: Value = serde_yaml::from_str("a: {c: 3}\ne: y").unwrap();
        merge_yaml(&mut dst, &src);

        let expected: Value = serde_yaml::from_str("a: {b: 1, c: 3}\nd: x\ne: y").unwrap();
        assert_eq!(dst, expected);
    }

    #[test]
    fn test_lower_keys() {
        let value: Value = serde_yaml::from_str("Inspect: {Format: JSON}").unwrap();
        let lowered = Config::lower_keys_value(value);
        let expected: Value = serde_yaml::from_str("inspect: {format: JSON}").unwrap();
        assert_eq!(lowered, expected);
    }

    #[test]
    fn test_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_with_overrides(
            dir.path().to_str().unwrap(),
            vars(&[
                ("MEDIAITEM_CONFIG__INSPECT__FORMAT", "yaml"),
                ("MEDIAITEM_CONFIG__INSPECT__AUDIO_ONLY", "true"),
                ("UNRELATED", "ignored"),
            ]),
        )
        .unwrap();

        assert_eq!(config.get_output_format(), "yaml");
        assert!(config.get_audio_only());
    }

    #[test]
    fn test_env_override_comma_separated_mime_types() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_with_overrides(
            dir.path().to_str().unwrap(),
            vars(&[(
                "MEDIAITEM_CONFIG__INSPECT__PREFERRED_MIME_TYPES",
                "audio/wav, audio/mpeg",
            )]),
        )
        .unwrap();

        assert_eq!(
            config.get_preferred_mime_types(),
            ["audio/wav", "audio/mpeg"]
        );
    }

    #[test]
    fn test_defaults_stay_in_memory() {
        let config = Config::defaults_with_overrides(vars(&[(
            "MEDIAITEM_CONFIG__INSPECT__FORMAT",
            "didl",
        )]))
        .unwrap();

        assert_eq!(config.dir(), None);
        assert_eq!(config.file_path(), None);
        assert_eq!(config.get_output_format(), "didl");
        assert_eq!(config.get_log_min_level(), "INFO");

        config.set_audio_only(true).unwrap();
        assert!(config.get_audio_only());
    }

    #[test]
    fn test_get_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_with_overrides(dir.path().to_str().unwrap(), vars(&[])).unwrap();
        assert!(config.get_value(&["nope", "missing"]).is_err());
    }
}
