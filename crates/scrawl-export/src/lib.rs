#![forbid(unsafe_code)]

//! Export geometry pipeline for `scrawl` scenes.
//!
//! The interesting work here is not painting shapes (that belongs to an
//! external sketch renderer plugged in through trait seams) but the geometry
//! around it: deriving a padded bounding box from an arbitrary element set,
//! reconciling the competing sizing policies, and producing one consistent
//! scroll-offset + scale transform that raster and vector targets consume
//! identically.

pub mod bounds;
pub mod sizing;
pub mod svg;

pub use bounds::{ExportBounds, export_bounds, get_export_size};
pub use sizing::{DimensionResolver, ResolvedDimensions, ResolvedSizing, SizingOptions};
pub use svg::{
    JsonSceneSerializer, OutlineSvgRenderer, SceneSerializer, SvgDocument, SvgExportOptions,
    SvgNode, SvgRenderParams, SvgRenderer, export_to_svg, export_to_svg_sync,
    export_to_svg_sync_with,
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("shape renderer failed: {message}")]
    Renderer { message: String },

    #[error("scene serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Convenience for renderer implementations that report plain messages.
    pub fn renderer(message: impl Into<String>) -> Self {
        Error::Renderer {
            message: message.into(),
        }
    }
}
