use crate::app_state::AppState;
use crate::element::{BinaryFileData, BinaryFiles, Element};
use serde::Serialize;

/// Intended consumer of a serialized scene. Affects nothing but the recorded
/// `source` field today; kept explicit so stored and embedded payloads can
/// diverge later without a wire break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializeScope {
    /// Scene payload embedded inside an exported document.
    Export,
    /// Scene payload persisted by the host application.
    Local,
}

impl SerializeScope {
    fn source(self) -> &'static str {
        match self {
            SerializeScope::Export => "export",
            SerializeScope::Local => "local",
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SceneDocument<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    version: u32,
    source: &'static str,
    elements: &'a [Element],
    app_state: &'a AppState,
    files: Vec<&'a BinaryFileData>,
}

/// Serializes a full scene (elements + state + files) to deterministic JSON.
///
/// Files are emitted as a list sorted by id so the output is byte-identical
/// for identical inputs regardless of map iteration order.
pub fn serialize_scene_as_json(
    elements: &[Element],
    app_state: &AppState,
    files: &BinaryFiles,
    scope: SerializeScope,
) -> serde_json::Result<String> {
    let mut file_list: Vec<&BinaryFileData> = files.values().collect();
    file_list.sort_by(|a, b| a.id.cmp(&b.id));

    serde_json::to_string(&SceneDocument {
        kind: "scrawl",
        version: 2,
        source: scope.source(),
        elements,
        app_state,
        files: file_list,
    })
}
