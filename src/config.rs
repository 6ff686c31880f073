use glucosnap_core::UserSettings;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Where the two collections are kept on disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per collection
    #[default]
    File,
    /// A key-value table in a SQLite database
    Sqlite,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::File => write!(f, "file"),
            StorageBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "sqlite" => Ok(StorageBackend::Sqlite),
            _ => Err(format!(
                "Invalid storage backend '{}'. Valid options: file, sqlite",
                s
            )),
        }
    }
}

/// Meal photo analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Gemini API key
    #[serde(serialize_with = "redact")]
    pub api_key: Option<String>,
    /// Model used for photo analysis
    pub model: String,
    /// Base URL of the Gemini REST API
    pub endpoint: String,
    /// Return placeholder items instead of calling the service
    pub demo_mode: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            demo_mode: false,
        }
    }
}

fn redact<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(_) => serializer.serialize_some("********"),
        None => serializer.serialize_none(),
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding the stored collections
    pub data_dir: ConfigValue<PathBuf>,
    /// Storage backend
    pub storage: ConfigValue<StorageBackend>,
    /// Target ceiling for HbA1c, in percent
    pub a1c_target: ConfigValue<f64>,
    /// Daily calorie budget
    pub calorie_target: ConfigValue<u32>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// Analysis configuration
    pub analysis: AnalysisConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    storage: Option<StorageBackend>,
    a1c_target: Option<f64>,
    calorie_target: Option<u32>,
    analysis: Option<AnalysisConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let defaults = UserSettings::default();

        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut storage = ConfigValue::new(StorageBackend::default(), ConfigSource::Default);
        let mut a1c_target = ConfigValue::new(defaults.a1c_target, ConfigSource::Default);
        let mut calorie_target = ConfigValue::new(defaults.calorie_target, ConfigSource::Default);
        let mut config_file = None;
        let mut analysis = AnalysisConfig::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                // Resolve relative paths against config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(backend) = file_config.storage {
                storage = ConfigValue::new(backend, ConfigSource::File);
            }
            if let Some(target) = file_config.a1c_target {
                a1c_target = ConfigValue::new(target, ConfigSource::File);
            }
            if let Some(target) = file_config.calorie_target {
                calorie_target = ConfigValue::new(target, ConfigSource::File);
            }
            if let Some(analysis_config) = file_config.analysis {
                analysis = analysis_config;
            }
        }

        // Apply environment variable overrides
        if let Ok(dir) = std::env::var("GLUCOSNAP_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Some(backend) = env_parsed::<StorageBackend>("GLUCOSNAP_STORAGE")? {
            storage = ConfigValue::new(backend, ConfigSource::Environment);
        }
        if let Some(target) = env_parsed::<f64>("GLUCOSNAP_A1C_TARGET")? {
            a1c_target = ConfigValue::new(target, ConfigSource::Environment);
        }
        if let Some(target) = env_parsed::<u32>("GLUCOSNAP_CALORIE_TARGET")? {
            calorie_target = ConfigValue::new(target, ConfigSource::Environment);
        }
        if let Ok(key) = std::env::var("GLUCOSNAP_API_KEY").or_else(|_| std::env::var("API_KEY"))
        {
            analysis.api_key = Some(key);
        }
        if let Some(demo) = env_parsed::<bool>("GLUCOSNAP_DEMO_MODE")? {
            analysis.demo_mode = demo;
        }

        Ok(Self {
            data_dir,
            storage,
            a1c_target,
            calorie_target,
            config_file,
            analysis,
        })
    }

    pub fn user_settings(&self) -> UserSettings {
        UserSettings {
            a1c_target: self.a1c_target.value,
            calorie_target: self.calorie_target.value,
        }
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/glucosnap/
    /// - macOS: ~/Library/Application Support/glucosnap/
    /// - Windows: %APPDATA%/glucosnap/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("glucosnap")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/glucosnap/
    /// - macOS: ~/Library/Application Support/glucosnap/
    /// - Windows: %APPDATA%/glucosnap/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("glucosnap")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

fn env_parsed<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv(name, raw)),
        Err(_) => Ok(None),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidEnv(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidEnv(name, value) => {
                write!(f, "Invalid value '{}' for environment variable {}", value, name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    // Config::load reads process-wide env vars; tests that set them must not
    // overlap with tests that load.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn load(path: PathBuf) -> Result<Config, ConfigError> {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        Config::load(Some(path))
    }

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = load(config_path).unwrap();
        assert!(config.data_dir.value.ends_with("glucosnap"));
        assert_eq!(config.storage.value, StorageBackend::File);
        assert_eq!(config.calorie_target.value, 2000);
        assert_eq!(config.a1c_target.source, ConfigSource::Default);
        assert!(config.config_file.is_none());
        assert_eq!(config.analysis.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /custom/glucosnap").unwrap();
        writeln!(file, "storage: sqlite").unwrap();
        writeln!(file, "calorie_target: 1800").unwrap();
        writeln!(file, "analysis:").unwrap();
        writeln!(file, "  demo_mode: true").unwrap();

        let config = load(config_path.clone()).unwrap();
        assert_eq!(config.data_dir.value, PathBuf::from("/custom/glucosnap"));
        assert_eq!(config.data_dir.source, ConfigSource::File);
        assert_eq!(config.storage.value, StorageBackend::Sqlite);
        assert_eq!(config.calorie_target.value, 1800);
        assert!(config.analysis.demo_mode);
        assert_eq!(config.analysis.model, "gemini-2.5-flash");
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_relative_data_dir_resolves_against_config_dir() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: data\n").unwrap();

        let config = load(config_path).unwrap();
        assert_eq!(config.data_dir.value, temp_dir.path().join("data"));
    }

    #[test]
    fn test_user_settings_from_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "a1c_target: 7.0\ncalorie_target: 2200\n").unwrap();

        let settings = load(config_path).unwrap().user_settings();
        assert_eq!(settings.a1c_target, 7.0);
        assert_eq!(settings.calorie_target, 2200);
    }

    #[test]
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: /from/file\n").unwrap();

        let config = {
            let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
            std::env::set_var("GLUCOSNAP_DATA_DIR", "/from/env");
            let config = Config::load(Some(config_path));
            std::env::remove_var("GLUCOSNAP_DATA_DIR");
            config.unwrap()
        };

        assert_eq!(config.data_dir.value, PathBuf::from("/from/env"));
        assert_eq!(config.data_dir.source, ConfigSource::Environment);
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let err = load(config_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_api_key_is_redacted_in_json() {
        let analysis = AnalysisConfig {
            api_key: Some("secret".to_string()),
            ..AnalysisConfig::default()
        };
        let json = serde_json::to_string(&analysis).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("********"));
    }

    #[test]
    fn test_storage_backend_from_str() {
        assert_eq!("SQLite".parse::<StorageBackend>().unwrap(), StorageBackend::Sqlite);
        assert!("postgres".parse::<StorageBackend>().is_err());
    }
}
