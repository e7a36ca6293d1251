#![forbid(unsafe_code)]

//! `scrawl` is a headless export pipeline for freehand whiteboard scenes.
//!
//! Given a finite set of drawing elements on an infinite canvas it produces
//! either a pixel surface or a scalable vector document that visually match
//! the on-screen scene. Shape painting is delegated to an external sketch
//! renderer plugged in through trait seams; this crate owns the geometry:
//! bounding boxes, the sizing-policy precedence, and the shared render
//! transform.
//!
//! # Features
//!
//! - `raster`: enable the pixel pipeline (`scrawl::raster`) over `tiny-skia`
//!   pixmaps with `image`-based data-URL decoding

pub use scrawl_scene::*;

pub use scrawl_export as export;
pub use scrawl_export::{
    DimensionResolver, ExportBounds, OutlineSvgRenderer, ResolvedDimensions, SceneSerializer,
    SvgDocument, SvgExportOptions, SvgNode, SvgRenderParams, SvgRenderer, export_bounds,
    export_to_svg, export_to_svg_sync, get_export_size,
};

#[cfg(feature = "raster")]
pub mod raster;
