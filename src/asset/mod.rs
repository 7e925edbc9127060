//! Asset access for the inlining pass.
//!
//! - [`AssetKind`]: svg / png / unsupported, from the `src` extension
//! - [`read_text`], [`read_bytes`]: async reads relative to an asset root
//! - [`png_data_uri`]: base64 `data:` URI for raster assets

mod fetch;
mod kind;

pub use fetch::{png_data_uri, read_bytes, read_text, resolve_path};
pub use kind::AssetKind;
