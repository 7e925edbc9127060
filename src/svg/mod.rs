//! SVG optimizer adapter.
//!
//! # Modules
//!
//! - [`plugins`]: plugin settings, defaults and caller overrides
//! - `optimize`: the usvg-backed [`UsvgOptimizer`]
//! - `bounds`: stroke-inclusive bounds for `expandViewBox`
//!
//! The inlining pass only sees the [`SvgOptimizer`] trait, so hosts can plug
//! in another optimizer (or a passthrough one in tests).

mod bounds;
mod optimize;
pub mod plugins;

pub use optimize::{UsvgOptimizer, optimize_svg};
pub use plugins::{OptimizerConfig, PluginSetting};

/// Turns SVG source into optimized SVG markup
///
/// Called from a blocking thread; implementations may be CPU heavy.
pub trait SvgOptimizer: Send + Sync {
    fn optimize(&self, svg: &str, plugins: &OptimizerConfig) -> anyhow::Result<String>;
}
