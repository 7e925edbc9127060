//! SVG optimization using usvg.
//!
//! usvg normalizes the document (shapes to paths, resolved styles, no
//! editor metadata) and writes it back minified. Root-level plugins are
//! applied afterwards on the written markup.

use anyhow::{Context, Result};

use crate::dom::parse_fragment;

use super::bounds::{calculate_stroke_bounds, viewbox_value};
use super::plugins::{
    ADD_CLASSES, CLEANUP_NUMERIC_VALUES, CONVERT_TRANSFORM, EXPAND_VIEWBOX, OptimizerConfig,
    PREFIX_IDS, REMOVE_DIMENSIONS, REMOVE_XMLNS,
};
use super::SvgOptimizer;

/// Precision usvg uses when a precision plugin is disabled
const FULL_PRECISION: u8 = 8;

/// Optimizer backed by usvg
#[derive(Debug, Clone, Copy, Default)]
pub struct UsvgOptimizer;

impl SvgOptimizer for UsvgOptimizer {
    fn optimize(&self, svg: &str, plugins: &OptimizerConfig) -> Result<String> {
        optimize_svg(svg, plugins)
    }
}

/// Optimize SVG markup with the given plugin set
pub fn optimize_svg(svg: &str, plugins: &OptimizerConfig) -> Result<String> {
    let tree =
        usvg::Tree::from_str(svg, &usvg::Options::default()).context("Failed to parse SVG")?;

    let id_prefix = plugins
        .is_enabled(PREFIX_IDS)
        .then(|| plugins.param_str(PREFIX_IDS, "prefix").unwrap_or("svg-").to_string());

    let write_options = usvg::WriteOptions {
        id_prefix,
        coordinates_precision: plugins
            .param_u8(CLEANUP_NUMERIC_VALUES, "floatPrecision")
            .unwrap_or(FULL_PRECISION),
        transforms_precision: plugins
            .param_u8(CONVERT_TRANSFORM, "floatPrecision")
            .unwrap_or(FULL_PRECISION),
        indent: usvg::Indent::None,
        attributes_indent: usvg::Indent::None,
        ..Default::default()
    };

    let optimized = tree.to_string(&write_options);

    let viewbox = plugins
        .is_enabled(EXPAND_VIEWBOX)
        .then(|| calculate_stroke_bounds(&tree))
        .flatten()
        .map(viewbox_value);

    Ok(edit_root(optimized, plugins, viewbox))
}

/// Apply root-element plugins to written markup
fn edit_root(svg: String, plugins: &OptimizerConfig, viewbox: Option<String>) -> String {
    let remove_dimensions = plugins.is_enabled(REMOVE_DIMENSIONS);
    let remove_xmlns = plugins.is_enabled(REMOVE_XMLNS);
    let classes = plugins.param_str_list(ADD_CLASSES, "classNames");

    if !remove_dimensions && !remove_xmlns && classes.is_empty() && viewbox.is_none() {
        return svg;
    }

    let mut fragment = parse_fragment(&svg);
    let Some(root) = fragment
        .top_elements()
        .into_iter()
        .find(|&id| fragment.element(id).is_some_and(|e| e.is_tag("svg")))
    else {
        return svg;
    };
    let Some(elem) = fragment.element_mut(root) else {
        return svg;
    };

    if let Some(viewbox) = viewbox {
        elem.set_attr("viewBox", viewbox);
    }
    if remove_dimensions {
        elem.remove_attr("width");
        elem.remove_attr("height");
    }
    if remove_xmlns {
        elem.remove_attr("xmlns");
        elem.remove_attr("xmlns:xlink");
    }
    elem.add_classes(classes);

    fragment.to_html()
}
