//! Configuration for the inlining pass, usually `inline.toml`.
//!
//! Every field is optional:
//!
//! ```toml
//! root = "public"             # base directory for relative `src` values
//! concurrency = 16            # assets resolved at once
//! timeout_ms = 0              # per-asset limit, 0 = wait indefinitely
//! preserve_attributes = false # carry <img> attributes onto inlined <svg>
//!
//! [[descriptor]]              # replaces the built-in svg/png descriptors
//! tag = "img"
//! marker = "inline"
//! src = '\.svg$'
//!
//! [optimizer]                 # svgo-style plugin overrides
//! removeDimensions = true
//! ```

mod error;

pub use error::ConfigError;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::inline::{DEFAULT_MARKER, Descriptor};
use crate::log;
use crate::svg::OptimizerConfig;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "inline.toml";

/// Root configuration structure representing `inline.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InlineConfig {
    /// Directory `src` values are resolved against.
    pub root: PathBuf,

    /// Maximum number of assets resolved concurrently.
    pub concurrency: usize,

    /// Per-asset timeout in milliseconds, `0` disables it.
    pub timeout_ms: u64,

    /// Merge the `<img>` attributes onto the inlined SVG root.
    pub preserve_attributes: bool,

    /// Candidate descriptors; empty means the built-in svg + png pair.
    #[serde(rename = "descriptor")]
    pub descriptors: Vec<DescriptorConfig>,

    /// Plugin overrides, overlaid on the optimizer defaults.
    pub optimizer: OptimizerConfig,
}

impl Default for InlineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            concurrency: 16,
            timeout_ms: 0,
            preserve_attributes: false,
            descriptors: Vec::new(),
            optimizer: OptimizerConfig::default(),
        }
    }
}

/// One `[[descriptor]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorConfig {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default = "default_marker")]
    pub marker: String,
    /// Regular expression matched against the `src` value.
    pub src: String,
}

fn default_tag() -> String {
    "img".to_string()
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

impl InlineConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a file, warning about unknown fields.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            print_unknown_fields_warning(&ignored, path);
        }

        let unknown = config.optimizer.unknown_plugins();
        if !unknown.is_empty() {
            log!("warning"; "unknown optimizer plugins ignored: {}", unknown.join(", "));
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    pub fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Per-asset timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    /// Compile the descriptor list, falling back to the built-in pair.
    pub fn compile_descriptors(&self) -> Result<Vec<Descriptor>, ConfigError> {
        if self.descriptors.is_empty() {
            return Ok(Descriptor::defaults(DEFAULT_MARKER));
        }
        self.descriptors
            .iter()
            .map(|d| {
                Descriptor::new(&d.tag, &d.marker, &d.src).map_err(|source| ConfigError::Pattern {
                    pattern: d.src.clone(),
                    source,
                })
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Validation(
                "`concurrency` must be at least 1".into(),
            ));
        }
        for d in &self.descriptors {
            if d.tag.trim().is_empty() || d.marker.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "descriptor for `{}` needs a non-empty `tag` and `marker`",
                    d.src
                )));
            }
        }
        Ok(())
    }
}

/// Print warning about unknown fields.
fn print_unknown_fields_warning(fields: &[String], path: &Path) {
    let display_path = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy());
    log!("warning"; "unknown fields in {}, ignoring:", display_path);
    for field in fields {
        log!("warning"; "- {}", field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svg::plugins::REMOVE_DIMENSIONS;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = InlineConfig::from_str("").unwrap();
        assert_eq!(config, InlineConfig::default());
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.concurrency, 16);
        assert_eq!(config.timeout(), None);
        assert!(config.optimizer.is_empty());

        let descriptors = config.compile_descriptors().unwrap();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].src.as_str(), r"\.svg$");
    }

    #[test]
    fn test_parse_config() {
        let config = InlineConfig::from_str(
            r#"
            root = "public"
            concurrency = 4
            timeout_ms = 1500
            preserve_attributes = true

            [[descriptor]]
            src = '\.svg$'

            [[descriptor]]
            tag = "object"
            marker = "data-inline"
            src = '^icons/'

            [optimizer]
            removeDimensions = true
            "#,
        )
        .unwrap();

        assert_eq!(config.root, PathBuf::from("public"));
        assert_eq!(config.timeout(), Some(Duration::from_millis(1500)));
        assert!(config.preserve_attributes);
        assert_eq!(config.descriptors[0].tag, "img");
        assert_eq!(config.descriptors[0].marker, "inline");
        assert_eq!(config.descriptors[1].marker, "data-inline");
        assert!(config.optimizer.is_enabled(REMOVE_DIMENSIONS));

        let compiled = config.compile_descriptors().unwrap();
        assert_eq!(compiled[1].tag, "object");
    }

    #[test]
    fn test_parse_with_ignored() {
        let (config, ignored) =
            InlineConfig::parse_with_ignored("concurrency = 2\nunknown_key = 1\n").unwrap();
        assert_eq!(config.concurrency, 2);
        assert_eq!(ignored, vec!["unknown_key".to_string()]);
    }

    #[test]
    fn test_invalid_pattern() {
        let config = InlineConfig::from_str("[[descriptor]]\nsrc = '('\n").unwrap();
        let err = config.compile_descriptors().unwrap_err();
        assert!(matches!(err, ConfigError::Pattern { ref pattern, .. } if pattern == "("));
    }

    #[test]
    fn test_validate() {
        let config = InlineConfig {
            concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let config = InlineConfig::from_str("[[descriptor]]\ntag = ''\nsrc = 'x'\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "timeout_ms = 10\n").unwrap();
        let config = InlineConfig::load(&path).unwrap();
        assert_eq!(config.timeout(), Some(Duration::from_millis(10)));

        let err = InlineConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));

        fs::write(&path, "concurrency = \"many\"").unwrap();
        assert!(matches!(
            InlineConfig::load(&path),
            Err(ConfigError::Toml(_))
        ));
    }
}
