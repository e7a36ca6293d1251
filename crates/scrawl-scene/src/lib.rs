#![forbid(unsafe_code)]

//! Scene data model for `scrawl`.
//!
//! Design goals:
//! - immutable inputs: elements and binary files are never mutated by consumers
//! - deterministic, testable outputs (scene JSON is stable given identical inputs)
//! - no I/O: restoration and serialization are pure data transforms

pub mod app_state;
pub mod element;
pub mod geom;
pub mod restore;
pub mod serialize;

pub use app_state::{AppState, AppStateOverrides, DEFAULT_EXPORT_PADDING, Theme};
pub use element::{BinaryFileData, BinaryFiles, Element, ElementKind, FileId};
pub use restore::restore_app_state;
pub use serialize::{SerializeScope, serialize_scene_as_json};
