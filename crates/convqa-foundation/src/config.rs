//! Chain settings
//!
//! File-backed options for assembling a conversational retrieval chain.
//!
//! ```toml
//! combination_strategy = "map_reduce"
//! system_prompt = "You are the support assistant of ACME."
//! return_source_documents = true
//! retrieval_k = 6
//!
//! [notifier]
//! endpoint = "${TRANSCRIPT_ENDPOINT}"
//! user_id = "acme-support"
//! ```

use crate::chain::{CombinationStrategy, DEFAULT_RETRIEVAL_K};
use convqa_kernel::config::{self, ConfigError, ConfigResult, FileFormat};
use error_stack::Report;
use serde::{Deserialize, Serialize};

/// Environment prefix for setting overrides, e.g. `CONVQA_RETRIEVAL_K=6`.
pub const ENV_PREFIX: &str = "CONVQA";

/// Error-stack backed result alias for settings loading.
pub type SettingsReport<T> = ::std::result::Result<T, Report<ConfigError>>;

/// Extension trait to convert [`ConfigResult<T>`] into [`SettingsReport<T>`].
pub trait IntoSettingsReport<T> {
    /// Wrap the error in an `error_stack::Report`.
    fn into_report(self) -> SettingsReport<T>;
}

impl<T> IntoSettingsReport<T> for ConfigResult<T> {
    #[inline]
    fn into_report(self) -> SettingsReport<T> {
        self.map_err(Report::new)
    }
}

/// Where transcript copies are posted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifierSettings {
    pub endpoint: String,
    pub user_id: String,
    /// Request timeout in seconds
    #[serde(default = "default_notifier_timeout")]
    pub timeout_secs: u64,
}

fn default_notifier_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    pub combination_strategy: CombinationStrategy,
    pub system_prompt: Option<String>,
    pub return_source_documents: bool,
    pub retrieval_k: usize,
    /// Log every rendered prompt at debug level
    pub verbose: bool,
    pub notifier: Option<NotifierSettings>,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            combination_strategy: CombinationStrategy::default(),
            system_prompt: None,
            return_source_documents: false,
            retrieval_k: DEFAULT_RETRIEVAL_K,
            verbose: false,
            notifier: None,
        }
    }
}

impl ChainSettings {
    /// Load settings from a file, detecting the format from its extension.
    pub fn load(path: &str) -> SettingsReport<Self> {
        let settings: Self = config::load_config(path)
            .into_report()
            .map_err(|report| report.attach(format!("settings file: {path}")))?;
        settings.validated()
    }

    /// Load settings from a file with `CONVQA_*` environment overrides.
    pub fn load_with_env(path: &str) -> SettingsReport<Self> {
        let settings: Self = config::load_with_env(path, ENV_PREFIX)
            .into_report()
            .map_err(|report| {
                report
                    .attach(format!("settings file: {path}"))
                    .attach(format!("environment prefix: {ENV_PREFIX}"))
            })?;
        settings.validated()
    }

    /// Parse settings from a string in the given format.
    pub fn from_str(content: &str, format: FileFormat) -> SettingsReport<Self> {
        let settings: Self = config::from_str(content, format).into_report()?;
        settings.validated()
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.retrieval_k == 0 {
            return Err(ConfigError::invalid_value("retrieval_k", "must be at least 1"));
        }
        if let Some(notifier) = &self.notifier {
            if notifier.endpoint.trim().is_empty() {
                return Err(ConfigError::invalid_value("notifier.endpoint", "must not be empty"));
            }
        }
        Ok(())
    }

    fn validated(self) -> SettingsReport<Self> {
        self.validate().into_report()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_document_yields_defaults() {
        let settings = ChainSettings::from_str("{}", FileFormat::Json).unwrap();
        assert_eq!(settings, ChainSettings::default());
        assert_eq!(settings.combination_strategy, CombinationStrategy::Stuff);
        assert_eq!(settings.retrieval_k, 4);
        assert!(!settings.return_source_documents);
    }

    #[test]
    fn parses_toml() {
        let content = r#"
combination_strategy = "refine"
system_prompt = "Be brief."
return_source_documents = true
verbose = true

[notifier]
endpoint = "https://transcripts.example/api"
user_id = "acme"
"#;
        let settings = ChainSettings::from_str(content, FileFormat::Toml).unwrap();
        assert_eq!(settings.combination_strategy, CombinationStrategy::Refine);
        assert_eq!(settings.system_prompt.as_deref(), Some("Be brief."));
        assert!(settings.return_source_documents);
        assert!(settings.verbose);

        let notifier = settings.notifier.unwrap();
        assert_eq!(notifier.user_id, "acme");
        assert_eq!(notifier.timeout_secs, 10);
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let report = ChainSettings::from_str("combination_strategy: mapreduce", FileFormat::Yaml)
            .unwrap_err();
        assert!(matches!(report.current_context(), ConfigError::Serialization(_)));
    }

    #[test]
    fn zero_retrieval_k_is_rejected() {
        let report = ChainSettings::from_str(r#"{"retrieval_k": 0}"#, FileFormat::Json).unwrap_err();
        assert!(matches!(
            report.current_context(),
            ConfigError::InvalidValue { field, .. } if field == "retrieval_k"
        ));
    }

    #[test]
    fn load_from_yaml_file() {
        let file = temp_file(".yaml", "combination_strategy: map_reduce\nretrieval_k: 6\n");
        let settings = ChainSettings::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(settings.combination_strategy, CombinationStrategy::MapReduce);
        assert_eq!(settings.retrieval_k, 6);
    }

    #[test]
    fn missing_file_reports_io_error() {
        let report = ChainSettings::load("/nonexistent/convqa.toml").unwrap_err();
        assert!(matches!(report.current_context(), ConfigError::Io(_)));
    }

    #[test]
    fn environment_overrides_file() {
        let file = temp_file(".toml", "retrieval_k = 2\n");
        // SAFETY: no other test reads CONVQA_RETURN_SOURCE_DOCUMENTS.
        unsafe { std::env::set_var("CONVQA_RETURN_SOURCE_DOCUMENTS", "true") };

        let settings = ChainSettings::load_with_env(file.path().to_str().unwrap()).unwrap();

        unsafe { std::env::remove_var("CONVQA_RETURN_SOURCE_DOCUMENTS") };
        assert_eq!(settings.retrieval_k, 2);
        assert!(settings.return_source_documents);
    }
}
