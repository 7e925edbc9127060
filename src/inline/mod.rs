//! The inlining pass.
//!
//! ```text
//! html ──► parse_document ──► transform_tree ──► to_html ──► html
//!                              │
//!                              ├── matcher    which nodes qualify
//!                              ├── transform  fetch + optimize/encode
//!                              └── report     per-node outcome
//! ```
//!
//! The pass fails open at every level: a node that cannot be inlined stays
//! as written, and a document that cannot be parsed is returned unchanged.

mod matcher;
mod report;
mod transform;
mod traverse;


use std::sync::Arc;

pub use matcher::{DEFAULT_MARKER, Descriptor, first_match, matches};
pub use report::{InlineRecord, InlineReport, Outcome};
pub use transform::{Edit, TransformContext, apply, resolve};
pub use traverse::transform_tree;

use crate::config::{ConfigError, InlineConfig};
use crate::dom::parse_document;
use crate::svg::{OptimizerConfig, SvgOptimizer, UsvgOptimizer};

/// Result of [`Inliner::inline_with_report`]
#[derive(Debug)]
pub struct Inlined {
    pub html: String,
    pub report: InlineReport,
}

/// Reusable inlining pass over HTML documents
///
/// # Example
///
/// ```ignore
/// let inliner = Inliner::new(&InlineConfig::default())?;
/// let html = inliner.inline(r#"<img inline src="logo.svg">"#).await;
/// ```
#[derive(Debug, Clone)]
pub struct Inliner {
    descriptors: Vec<Descriptor>,
    ctx: Arc<TransformContext>,
}

impl Inliner {
    pub fn new(config: &InlineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let descriptors = config.compile_descriptors()?;
        let ctx = TransformContext {
            root: config.root.clone(),
            optimizer: Arc::new(UsvgOptimizer),
            plugins: Arc::new(OptimizerConfig::merged(&config.optimizer)),
            timeout: config.timeout(),
            concurrency: config.concurrency,
            preserve_attributes: config.preserve_attributes,
        };
        Ok(Self {
            descriptors,
            ctx: Arc::new(ctx),
        })
    }

    /// Swap the SVG optimizer.
    pub fn with_optimizer(mut self, optimizer: Arc<dyn SvgOptimizer>) -> Self {
        Arc::make_mut(&mut self.ctx).optimizer = optimizer;
        self
    }

    /// Replace the candidate descriptors.
    pub fn with_descriptors(mut self, descriptors: Vec<Descriptor>) -> Self {
        self.descriptors = descriptors;
        self
    }

    #[inline]
    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    #[inline]
    pub fn context(&self) -> &TransformContext {
        &self.ctx
    }

    /// Run the pass and return the rewritten document.
    pub async fn inline(&self, html: &str) -> String {
        self.inline_with_report(html).await.html
    }

    /// Run the pass, returning the document with per-node outcomes
    ///
    /// When no candidate was inlined the input is returned byte for byte.
    pub async fn inline_with_report(&self, html: &str) -> Inlined {
        let unchanged = |report| Inlined {
            html: html.to_string(),
            report,
        };

        let mut doc = match parse_document(html) {
            Ok(doc) => doc,
            Err(err) => {
                crate::debug!("inline"; "{}", err);
                return unchanged(InlineReport::default());
            }
        };

        let report = transform_tree(&mut doc, &self.descriptors, &self.ctx).await;
        if report.inlined() == 0 {
            return unchanged(report);
        }

        let output = doc.to_html();
        if output.is_empty() && !html.is_empty() {
            crate::debug!("inline"; "serialized document is empty, keeping input");
            return unchanged(report);
        }

        Inlined {
            html: output,
            report,
        }
    }
}

/// One-shot pass with the given configuration
///
/// An invalid configuration leaves the document untouched.
pub async fn inline_html(html: &str, config: &InlineConfig) -> String {
    match Inliner::new(config) {
        Ok(inliner) => inliner.inline(html).await,
        Err(err) => {
            crate::log!("error"; "{}", err);
            html.to_string()
        }
    }
}
