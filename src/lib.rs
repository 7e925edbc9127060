//! inline-assets - post-build HTML pass that inlines marked images.
//!
//! `<img inline src="*.svg">` is replaced by optimized SVG markup and
//! `<img inline src="*.png">` gets a base64 data URI. Anything that cannot
//! be inlined is left exactly as written.

pub mod asset;
pub mod cli;
pub mod config;
pub mod dom;
pub mod error;
pub mod inline;
pub mod logger;
pub mod svg;

pub use config::{ConfigError, InlineConfig};
pub use error::InlineError;
pub use inline::{InlineReport, Inlined, Inliner, inline_html};
pub use svg::{OptimizerConfig, SvgOptimizer, UsvgOptimizer};
