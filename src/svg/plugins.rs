//! Optimizer plugin settings.
//!
//! Plugin names follow the svgo vocabulary so existing `svgoConfig` objects
//! translate one to one. A plugin is either switched (`true`/`false`) or
//! enabled with a parameter table:
//!
//! ```toml
//! [optimizer]
//! removeDimensions = true
//! cleanupNumericValues = { floatPrecision = 2 }
//! addClassesToSVGElement = { classNames = ["icon"] }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const CLEANUP_NUMERIC_VALUES: &str = "cleanupNumericValues";
pub const CONVERT_TRANSFORM: &str = "convertTransform";
pub const PREFIX_IDS: &str = "prefixIds";
pub const EXPAND_VIEWBOX: &str = "expandViewBox";
pub const REMOVE_DIMENSIONS: &str = "removeDimensions";
pub const REMOVE_XMLNS: &str = "removeXMLNS";
pub const ADD_CLASSES: &str = "addClassesToSVGElement";

/// Plugins understood by the built-in optimizer.
pub const KNOWN_PLUGINS: &[&str] = &[
    CLEANUP_NUMERIC_VALUES,
    CONVERT_TRANSFORM,
    PREFIX_IDS,
    EXPAND_VIEWBOX,
    REMOVE_DIMENSIONS,
    REMOVE_XMLNS,
    ADD_CLASSES,
];

/// Setting of a single plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginSetting {
    Enabled(bool),
    Params(toml::Table),
}

impl PluginSetting {
    #[inline]
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Enabled(false))
    }

    fn params(&self) -> Option<&toml::Table> {
        match self {
            Self::Params(table) => Some(table),
            Self::Enabled(_) => None,
        }
    }
}

/// Plugin name -> setting
///
/// Built by overlaying caller overrides on [`OptimizerConfig::defaults`]:
/// caller keys replace default keys, default keys absent from the overrides
/// are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptimizerConfig(BTreeMap<String, PluginSetting>);

impl OptimizerConfig {
    /// The fixed default plugin set.
    pub fn defaults() -> Self {
        let precision = |p: i64| {
            let mut table = toml::Table::new();
            table.insert("floatPrecision".into(), toml::Value::Integer(p));
            PluginSetting::Params(table)
        };

        let mut plugins = BTreeMap::new();
        plugins.insert(CLEANUP_NUMERIC_VALUES.into(), precision(3));
        plugins.insert(CONVERT_TRANSFORM.into(), precision(3));
        plugins.insert(PREFIX_IDS.into(), PluginSetting::Enabled(false));
        plugins.insert(EXPAND_VIEWBOX.into(), PluginSetting::Enabled(false));
        plugins.insert(REMOVE_DIMENSIONS.into(), PluginSetting::Enabled(false));
        plugins.insert(REMOVE_XMLNS.into(), PluginSetting::Enabled(false));
        plugins.insert(ADD_CLASSES.into(), PluginSetting::Enabled(false));
        Self(plugins)
    }

    /// Defaults overlaid with `overrides`.
    pub fn merged(overrides: &OptimizerConfig) -> Self {
        let mut config = Self::defaults();
        for (name, setting) in &overrides.0 {
            config.0.insert(name.clone(), setting.clone());
        }
        config
    }

    pub fn set(&mut self, name: impl Into<String>, setting: PluginSetting) {
        self.0.insert(name.into(), setting);
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&PluginSetting> {
        self.0.get(name)
    }

    #[inline]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.get(name).is_some_and(PluginSetting::is_enabled)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names not in [`KNOWN_PLUGINS`].
    pub fn unknown_plugins(&self) -> Vec<&str> {
        self.0
            .keys()
            .map(String::as_str)
            .filter(|name| !KNOWN_PLUGINS.contains(name))
            .collect()
    }

    fn param(&self, plugin: &str, key: &str) -> Option<&toml::Value> {
        self.get(plugin)
            .filter(|s| s.is_enabled())
            .and_then(PluginSetting::params)
            .and_then(|params| params.get(key))
    }

    /// Integer parameter clamped into `u8`.
    pub fn param_u8(&self, plugin: &str, key: &str) -> Option<u8> {
        let value = self.param(plugin, key)?.as_integer()?;
        Some(value.clamp(0, i64::from(u8::MAX)) as u8)
    }

    pub fn param_str(&self, plugin: &str, key: &str) -> Option<&str> {
        self.param(plugin, key)?.as_str()
    }

    /// String list parameter; a single string is accepted as a list of one.
    pub fn param_str_list(&self, plugin: &str, key: &str) -> Vec<&str> {
        match self.param(plugin, key) {
            Some(toml::Value::Array(items)) => items.iter().filter_map(|v| v.as_str()).collect(),
            Some(toml::Value::String(s)) => vec![s.as_str()],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> OptimizerConfig {
        toml::from_str(src).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = OptimizerConfig::defaults();
        assert!(config.unknown_plugins().is_empty());
        assert_eq!(config.param_u8(CLEANUP_NUMERIC_VALUES, "floatPrecision"), Some(3));
        assert!(!config.is_enabled(REMOVE_DIMENSIONS));
        assert!(config.is_enabled(CONVERT_TRANSFORM));
    }

    #[test]
    fn test_merge_caller_wins_and_defaults_kept() {
        let overrides = parse(
            r#"
            removeDimensions = true
            cleanupNumericValues = { floatPrecision = 1 }
            "#,
        );
        let merged = OptimizerConfig::merged(&overrides);

        assert!(merged.is_enabled(REMOVE_DIMENSIONS));
        assert_eq!(merged.param_u8(CLEANUP_NUMERIC_VALUES, "floatPrecision"), Some(1));
        // untouched defaults survive
        assert_eq!(merged.param_u8(CONVERT_TRANSFORM, "floatPrecision"), Some(3));
        assert!(merged.get(REMOVE_XMLNS).is_some());
    }

    #[test]
    fn test_disabled_plugin_hides_params() {
        let overrides = parse("cleanupNumericValues = false");
        let merged = OptimizerConfig::merged(&overrides);
        assert!(!merged.is_enabled(CLEANUP_NUMERIC_VALUES));
        assert_eq!(merged.param_u8(CLEANUP_NUMERIC_VALUES, "floatPrecision"), None);
    }

    #[test]
    fn test_params() {
        let config = parse(
            r#"
            prefixIds = { prefix = "icon-" }
            addClassesToSVGElement = { classNames = ["a", "b"] }
            other = { classNames = "single" }
            big = { floatPrecision = 9000 }
            "#,
        );
        assert_eq!(config.param_str(PREFIX_IDS, "prefix"), Some("icon-"));
        assert_eq!(config.param_str_list(ADD_CLASSES, "classNames"), vec!["a", "b"]);
        assert_eq!(config.param_str_list("other", "classNames"), vec!["single"]);
        assert_eq!(config.param_u8("big", "floatPrecision"), Some(255));
        assert_eq!(config.unknown_plugins(), vec!["big", "other"]);
    }
}
