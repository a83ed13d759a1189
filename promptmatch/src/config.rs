//! Service configuration.
//!
//! A [`Config`] is assembled once at startup from, in increasing precedence:
//! built-in defaults, a [`Profile`], an optional YAML/JSON file and a few
//! environment variables. After that it is shared read-only.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::criteria::{CriteriaTable, PromptCriteria};
use crate::error::ConfigError;

/// Environment variable selecting the profile.
pub const ENV_PROFILE: &str = "PROMPTMATCH_ENV";
/// Environment variable pointing at a config file.
pub const ENV_CONFIG: &str = "PROMPTMATCH_CONFIG";
/// Environment variable overriding the secret key.
pub const ENV_SECRET_KEY: &str = "SECRET_KEY";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
/// Environment variable naming a log file.
pub const ENV_LOG_FILE: &str = "LOG_FILE";

/// Placeholder secret used when none is configured.
pub const DEV_SECRET_KEY: &str = "dev-secret-key-change-in-production";
/// Default cap on the `data` field, in characters.
pub const DEFAULT_MAX_DATA_LENGTH: usize = 10_000;

/// Named configuration preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Development,
    Production,
    Testing,
}

impl Profile {
    /// Whether debug behaviour is enabled.
    pub fn debug(&self) -> bool {
        !matches!(self, Profile::Production)
    }

    /// Log level used unless overridden.
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Profile::Production => "info",
            Profile::Development | Profile::Testing => "debug",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Development => write!(f, "development"),
            Profile::Production => write!(f, "production"),
            Profile::Testing => write!(f, "testing"),
        }
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "default" | "" => Ok(Profile::Development),
            "production" => Ok(Profile::Production),
            "testing" => Ok(Profile::Testing),
            _ => Err(ConfigError::UnknownProfile(s.to_string())),
        }
    }
}

/// Allowed values for the three categorical request fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub situations: Vec<String>,
    pub levels: Vec<String>,
    pub file_types: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            situations: strings(&["Commercial Auto", "General Liability", "Workers Compensation"]),
            levels: strings(&["Structure", "Summarize"]),
            file_types: strings(&["Medical Records", "Deposition", "Summons", "Summary Report"]),
        }
    }
}

impl Vocabulary {
    pub fn has_situation(&self, value: &str) -> bool {
        self.situations.iter().any(|v| v == value)
    }

    pub fn has_level(&self, value: &str) -> bool {
        self.levels.iter().any(|v| v == value)
    }

    pub fn has_file_type(&self, value: &str) -> bool {
        self.file_types.iter().any(|v| v == value)
    }

    /// Whether every attribute of the prompt is inside the vocabulary.
    pub fn covers(&self, c: &PromptCriteria) -> bool {
        self.has_situation(&c.situation) && self.has_level(&c.level) && self.has_file_type(&c.file_type)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.situations.is_empty() {
            return Err(ConfigError::EmptyVocabulary("situations"));
        }
        if self.levels.is_empty() {
            return Err(ConfigError::EmptyVocabulary("levels"));
        }
        if self.file_types.is_empty() {
            return Err(ConfigError::EmptyVocabulary("file_types"));
        }
        Ok(())
    }
}

/// Descriptive API metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiInfo {
    #[serde(default = "default_api_version")]
    pub version: String,
    #[serde(default = "default_api_title")]
    pub title: String,
    #[serde(default = "default_api_description")]
    pub description: String,
}

impl Default for ApiInfo {
    fn default() -> Self {
        Self {
            version: default_api_version(),
            title: default_api_title(),
            description: default_api_description(),
        }
    }
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_api_title() -> String {
    "Prompt Matching API".to_string()
}

fn default_api_description() -> String {
    "API for matching system prompts based on situation, level, and file type".to_string()
}

/// On-disk configuration overrides. Every field is optional.
///
/// ```yaml
/// situations: [Commercial Auto, General Liability]
/// levels: [Structure, Summarize]
/// file_types: [Summons, Deposition]
/// prompts:
///   - id: Prompt 1
///     situation: Commercial Auto
///     level: Structure
///     file_type: Summons
/// max_data_length: 5000
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub situations: Option<Vec<String>>,
    #[serde(default)]
    pub levels: Option<Vec<String>>,
    #[serde(default)]
    pub file_types: Option<Vec<String>>,
    #[serde(default)]
    pub prompts: Option<Vec<PromptCriteria>>,
    #[serde(default)]
    pub api: Option<ApiInfo>,
    #[serde(default)]
    pub max_data_length: Option<usize>,
}

impl ConfigFile {
    /// Read a config file; `.json` is parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        match ext {
            "json" => Ok(serde_json::from_slice(&data)?),
            _ => Ok(serde_yaml::from_slice(&data)?),
        }
    }
}

/// Immutable service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub profile: Profile,
    pub vocabulary: Vocabulary,
    pub table: CriteriaTable,
    pub api: ApiInfo,
    pub secret_key: String,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub max_data_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_profile(Profile::default())
    }
}

impl Config {
    /// Built-in defaults for a profile.
    pub fn for_profile(profile: Profile) -> Self {
        Self {
            profile,
            vocabulary: Vocabulary::default(),
            table: CriteriaTable::default(),
            api: ApiInfo::default(),
            secret_key: DEV_SECRET_KEY.to_string(),
            log_level: profile.default_log_level().to_string(),
            log_file: None,
            max_data_length: DEFAULT_MAX_DATA_LENGTH,
        }
    }

    /// Assemble configuration from the process environment.
    ///
    /// `profile` and `file` take precedence over `PROMPTMATCH_ENV` and
    /// `PROMPTMATCH_CONFIG` respectively.
    pub fn from_env(profile: Option<&str>, file: Option<&Path>) -> Result<Self, ConfigError> {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        let profile = match profile.map(str::to_string).or_else(|| env(ENV_PROFILE)) {
            Some(name) => name.parse()?,
            None => Profile::default(),
        };

        let mut cfg = Self::for_profile(profile);

        let file = file.map(Path::to_path_buf).or_else(|| env(ENV_CONFIG).map(PathBuf::from));
        if let Some(path) = file {
            cfg = cfg.with_file(ConfigFile::load(&path)?)?;
        }

        Ok(cfg.with_env(env))
    }

    /// Apply file overrides and re-check the result.
    pub fn with_file(mut self, file: ConfigFile) -> Result<Self, ConfigError> {
        if let Some(v) = file.situations {
            self.vocabulary.situations = v;
        }
        if let Some(v) = file.levels {
            self.vocabulary.levels = v;
        }
        if let Some(v) = file.file_types {
            self.vocabulary.file_types = v;
        }
        if let Some(prompts) = file.prompts {
            self.table = CriteriaTable::new(prompts)?;
        }
        if let Some(api) = file.api {
            self.api = api;
        }
        if let Some(n) = file.max_data_length {
            self.max_data_length = n;
        }

        self.vocabulary.check()?;
        Ok(self)
    }

    /// Prompts whose attributes fall outside the vocabulary and can never match.
    pub fn unreachable_prompts(&self) -> Vec<&PromptCriteria> {
        self.table
            .entries()
            .iter()
            .filter(|c| !self.vocabulary.covers(c))
            .collect()
    }

    /// Log configuration problems that do not prevent startup.
    pub fn log_warnings(&self) {
        for c in self.unreachable_prompts() {
            warn!(prompt = %c.id, "prompt uses values outside the vocabulary and can never match");
        }
        if self.profile == Profile::Production && self.uses_dev_secret() {
            warn!("running in production with the development secret key");
        }
    }

    /// Apply `SECRET_KEY`, `LOG_LEVEL` and `LOG_FILE` from a lookup function.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(ENV_SECRET_KEY) {
            self.secret_key = key;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level.to_lowercase();
        }
        if let Some(file) = lookup(ENV_LOG_FILE) {
            self.log_file = Some(PathBuf::from(file));
        }
        self
    }

    /// Whether the placeholder secret is still in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.secret_key == DEV_SECRET_KEY
    }
}

/// Masks a secret for display, keeping four characters at each end.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}{}", head, "*".repeat(chars.len() - 8), tail)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_profile_parse() {
        assert_eq!("development".parse::<Profile>().unwrap(), Profile::Development);
        assert_eq!("default".parse::<Profile>().unwrap(), Profile::Development);
        assert_eq!("Production".parse::<Profile>().unwrap(), Profile::Production);
        assert_eq!("testing".parse::<Profile>().unwrap(), Profile::Testing);
        assert!(matches!(
            "staging".parse::<Profile>(),
            Err(ConfigError::UnknownProfile(_))
        ));
    }

    #[test]
    fn test_profile_defaults() {
        let dev = Config::for_profile(Profile::Development);
        assert!(dev.profile.debug());
        assert_eq!(dev.log_level, "debug");

        let prod = Config::for_profile(Profile::Production);
        assert!(!prod.profile.debug());
        assert_eq!(prod.log_level, "info");
        assert_eq!(prod.max_data_length, DEFAULT_MAX_DATA_LENGTH);
        assert_eq!(prod.api.title, "Prompt Matching API");
        assert!(prod.uses_dev_secret());
    }

    #[test]
    fn test_with_env() {
        let vars: HashMap<&str, &str> = [
            (ENV_SECRET_KEY, "s3cr3t-value-123"),
            (ENV_LOG_LEVEL, "WARN"),
            (ENV_LOG_FILE, "logs/app.log"),
        ]
        .into();

        let cfg = Config::default().with_env(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.secret_key, "s3cr3t-value-123");
        assert!(!cfg.uses_dev_secret());
        assert_eq!(cfg.log_level, "warn");
        assert_eq!(cfg.log_file, Some(PathBuf::from("logs/app.log")));
    }

    #[test]
    fn test_with_file_overrides_table() {
        let yaml = r#"
levels: [Structure, Summarize, Review]
prompts:
  - id: Review Deposition
    situation: General Liability
    level: Review
    file_type: Deposition
max_data_length: 16
"#;
        let file: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        let cfg = Config::default().with_file(file).unwrap();

        assert_eq!(cfg.table.len(), 1);
        assert!(cfg.vocabulary.has_level("Review"));
        assert!(cfg.vocabulary.has_situation("Commercial Auto"));
        assert_eq!(cfg.max_data_length, 16);
        assert!(cfg.unreachable_prompts().is_empty());
    }

    #[test]
    fn test_unreachable_prompts() {
        let yaml = r#"
prompts:
  - id: Prompt 1
    situation: Commercial Auto
    level: Structure
    file_type: Summary Report
  - id: Prompt X
    situation: Marine
    level: Structure
    file_type: Summons
"#;
        let file: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        let cfg = Config::default().with_file(file).unwrap();
        let ids: Vec<&str> = cfg.unreachable_prompts().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["Prompt X"]);
    }

    #[test]
    fn test_with_file_rejects_empty_vocabulary() {
        let file: ConfigFile = serde_yaml::from_str("situations: []").unwrap();
        let err = Config::default().with_file(file).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyVocabulary("situations")));
    }

    #[test]
    fn test_unknown_file_key_rejected() {
        assert!(serde_yaml::from_str::<ConfigFile>("prompt: []").is_err());
    }

    #[test]
    fn test_load_json_file() {
        let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(f, r#"{{"api": {{"title": "Claims Prompt API"}}}}"#).unwrap();

        let file = ConfigFile::load(f.path()).unwrap();
        let cfg = Config::default().with_file(file).unwrap();
        assert_eq!(cfg.api.title, "Claims Prompt API");
        assert_eq!(cfg.api.version, "v1");
    }

    #[test]
    fn test_load_missing_file() {
        let err = ConfigFile::load(Path::new("/nonexistent/promptmatch.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("short"), "*****");
        assert_eq!(mask_secret("abcdefghijkl"), "abcd****ijkl");
    }
}
