use crate::bounds::export_bounds;
use crate::{Error, Result};
use base64::Engine as _;
use scrawl_scene::{AppState, BinaryFiles, Element, ElementKind, SerializeScope};
use std::fmt::Write as _;

/// CSS filter applied to the document root for dark-mode exports.
pub const THEME_FILTER: &str = "invert(93%) hue-rotate(180deg)";

/// Media type recorded on the embedded scene payload.
pub const EMBEDDED_SCENE_MIME: &str = "application/vnd.scrawl+json";

const FONT_FAMILIES: &[(&str, &str)] = &[("Scrawl", "Scrawl.woff2"), ("ScrawlCode", "ScrawlCode.woff2")];

/// A markup node of the vector document. Renderers build their output as a
/// tree of these; serialization is deterministic (attributes keep insertion
/// order, numbers go through [`fmt_num`]).
#[derive(Debug, Clone, PartialEq)]
pub struct SvgNode {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<SvgNode>,
    text: Option<String>,
}

impl SvgNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn attr_num(self, name: impl Into<String>, value: f64) -> Self {
        self.attr(name, fmt_num(value))
    }

    /// Sets text content. Escaped on serialization.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, node: SvgNode) -> Self {
        self.children.push(node);
        self
    }

    pub fn push(&mut self, node: SvgNode) {
        self.children.push(node);
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn children(&self) -> &[SvgNode] {
        &self.children
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (k, v) in &self.attrs {
            let _ = write!(out, r#" {k}="{}""#, escape_xml(v));
        }
        if self.children.is_empty() && self.text.as_deref().unwrap_or("").is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(t) = self.text.as_deref() {
            out.push_str(&escape_xml(t));
        }
        for c in &self.children {
            c.write_to(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// The vector document root produced by [`export_to_svg_sync`]. Ready to
/// serialize to text; structure is deterministic given identical inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    view_box_width: f64,
    view_box_height: f64,
    root: SvgNode,
}

impl SvgDocument {
    /// Intrinsic (unscaled) width, i.e. the viewBox width.
    pub fn view_box_width(&self) -> f64 {
        self.view_box_width
    }

    /// Intrinsic (unscaled) height, i.e. the viewBox height.
    pub fn view_box_height(&self) -> f64 {
        self.view_box_height
    }

    pub fn root(&self) -> &SvgNode {
        &self.root
    }

    /// Appends a child to the document root. This is the only mutation the
    /// shape renderer needs.
    pub fn push(&mut self, node: SvgNode) {
        self.root.push(node);
    }

    pub fn to_svg_string(&self) -> String {
        let mut out = String::new();
        self.root.write_to(&mut out);
        out
    }
}

/// Scene serializer consumed when embedding metadata. The default goes
/// through [`scrawl_scene::serialize_scene_as_json`]; tests inject failing
/// implementations to exercise the best-effort path.
pub trait SceneSerializer {
    fn serialize(
        &self,
        elements: &[Element],
        app_state: &AppState,
        files: &BinaryFiles,
        scope: SerializeScope,
    ) -> serde_json::Result<String>;
}

/// Default serializer backed by the scene crate.
pub struct JsonSceneSerializer;

impl SceneSerializer for JsonSceneSerializer {
    fn serialize(
        &self,
        elements: &[Element],
        app_state: &AppState,
        files: &BinaryFiles,
        scope: SerializeScope,
    ) -> serde_json::Result<String> {
        scrawl_scene::serialize_scene_as_json(elements, app_state, files, scope)
    }
}

/// Fixed transform handed to the shape renderer for the vector target.
/// There is no scale here: scaling happens purely through the document's
/// width/height vs. viewBox mismatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgRenderParams {
    pub offset_x: f64,
    pub offset_y: f64,
    pub dark_mode: bool,
}

/// External shape renderer for the vector target. Appends one node (or
/// subtree) per element using the fixed offset in [`SvgRenderParams`].
pub trait SvgRenderer {
    fn render_to_svg(
        &self,
        elements: &[Element],
        files: &BinaryFiles,
        document: &mut SvgDocument,
        params: &SvgRenderParams,
    ) -> Result<()>;
}

/// Deployment-dependent knobs for the vector pipeline. The embedding
/// application resolves these once at startup; the pipeline never branches on
/// deployment mode itself.
#[derive(Debug, Clone, Default)]
pub struct SvgExportOptions {
    /// Base path for font assets. `None` falls back to the hosted default
    /// derived from this package's name and version.
    pub asset_path: Option<String>,
    /// Origin substituted for a leading `/` in `asset_path`.
    pub origin: Option<String>,
}

fn default_asset_path() -> String {
    format!(
        "https://unpkg.com/{}@{}/dist/assets/",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}

fn resolve_asset_path(options: &SvgExportOptions) -> String {
    let path = options
        .asset_path
        .clone()
        .unwrap_or_else(default_asset_path);
    if path.starts_with('/') {
        format!("{}{}", options.origin.as_deref().unwrap_or(""), path)
    } else {
        path
    }
}

fn font_face_css(asset_path: &str) -> String {
    let mut css = String::new();
    for (family, file) in FONT_FAMILIES {
        let _ = write!(
            &mut css,
            r#"@font-face{{font-family:"{family}";src:url("{asset_path}{file}");}}"#
        );
    }
    css
}

/// Vector export with the default JSON scene serializer.
pub fn export_to_svg_sync(
    elements: &[Element],
    app_state: &AppState,
    files: &BinaryFiles,
    options: &SvgExportOptions,
    renderer: &dyn SvgRenderer,
) -> Result<SvgDocument> {
    export_to_svg_sync_with(elements, app_state, files, options, renderer, &JsonSceneSerializer)
}

/// Executor-free async wrapper around [`export_to_svg_sync`].
pub async fn export_to_svg(
    elements: &[Element],
    app_state: &AppState,
    files: &BinaryFiles,
    options: &SvgExportOptions,
    renderer: &dyn SvgRenderer,
) -> Result<SvgDocument> {
    export_to_svg_sync(elements, app_state, files, options, renderer)
}

/// Vector export pipeline.
///
/// Builds the document root (viewBox at intrinsic size, physical size scaled
/// by `export_scale`), embeds best-effort scene metadata and font faces,
/// draws the optional background rectangle, then hands the document to the
/// shape renderer with the `-min + padding` offset.
pub fn export_to_svg_sync_with(
    elements: &[Element],
    app_state: &AppState,
    files: &BinaryFiles,
    options: &SvgExportOptions,
    renderer: &dyn SvgRenderer,
    serializer: &dyn SceneSerializer,
) -> Result<SvgDocument> {
    let padding = app_state.export_padding;
    let bounds = export_bounds(elements, padding);
    let scale = app_state.export_scale;

    // Embedding failure is never fatal: log and export without metadata.
    let metadata = if app_state.export_embed_scene {
        match serializer.serialize(elements, app_state, files, SerializeScope::Export) {
            Ok(json) => Some(base64::engine::general_purpose::STANDARD.encode(json)),
            Err(error) => {
                tracing::warn!(%error, "failed to serialize scene for embedding; exporting without metadata");
                None
            }
        }
    } else {
        None
    };

    let mut root = SvgNode::new("svg")
        .attr("version", "1.1")
        .attr("xmlns", "http://www.w3.org/2000/svg")
        .attr(
            "viewBox",
            format!("0 0 {} {}", fmt_num(bounds.width), fmt_num(bounds.height)),
        )
        .attr_num("width", bounds.width * scale)
        .attr_num("height", bounds.height * scale);
    if app_state.export_with_dark_mode {
        root = root.attr("filter", THEME_FILTER);
    }

    if let Some(payload) = metadata {
        root = root.child(
            SvgNode::new("metadata")
                .attr("content-type", format!("{EMBEDDED_SCENE_MIME};base64"))
                .text(payload),
        );
    }

    root = root.child(
        SvgNode::new("defs").child(SvgNode::new("style").text(font_face_css(&resolve_asset_path(options)))),
    );

    if app_state.export_background && !app_state.view_background_color.is_empty() {
        root = root.child(
            SvgNode::new("rect")
                .attr_num("x", 0.0)
                .attr_num("y", 0.0)
                .attr_num("width", bounds.width)
                .attr_num("height", bounds.height)
                .attr("fill", app_state.view_background_color.clone()),
        );
    }

    let mut document = SvgDocument {
        view_box_width: bounds.width,
        view_box_height: bounds.height,
        root,
    };

    renderer.render_to_svg(
        elements,
        files,
        &mut document,
        &SvgRenderParams {
            offset_x: -bounds.min_x + padding,
            offset_y: -bounds.min_y + padding,
            dark_mode: app_state.export_with_dark_mode,
        },
    )?;

    Ok(document)
}

/// Renderer that draws plain element outlines. A stand-in for a full sketch
/// renderer, useful for integration tests and visual smoke checks.
pub struct OutlineSvgRenderer;

impl SvgRenderer for OutlineSvgRenderer {
    fn render_to_svg(
        &self,
        elements: &[Element],
        _files: &BinaryFiles,
        document: &mut SvgDocument,
        params: &SvgRenderParams,
    ) -> Result<()> {
        let stroke = if params.dark_mode { "#e3e3e8" } else { "#1e1e1e" };
        let mut group = SvgNode::new("g")
            .attr("class", "outlines")
            .attr("fill", "none")
            .attr("stroke", stroke);

        for el in elements {
            if el.is_deleted {
                continue;
            }
            let x = el.x + params.offset_x;
            let y = el.y + params.offset_y;
            let mut node = match el.kind {
                ElementKind::Ellipse => SvgNode::new("ellipse")
                    .attr_num("cx", x + el.width / 2.0)
                    .attr_num("cy", y + el.height / 2.0)
                    .attr_num("rx", el.width / 2.0)
                    .attr_num("ry", el.height / 2.0),
                _ => SvgNode::new("rect")
                    .attr_num("x", x)
                    .attr_num("y", y)
                    .attr_num("width", el.width)
                    .attr_num("height", el.height),
            };
            if el.angle != 0.0 {
                node = node.attr(
                    "transform",
                    format!(
                        "rotate({} {} {})",
                        fmt_num(el.angle.to_degrees()),
                        fmt_num(x + el.width / 2.0),
                        fmt_num(y + el.height / 2.0)
                    ),
                );
            }
            group.push(node);
        }

        document.push(group);
        Ok(())
    }
}

/// Stringifies a number for SVG attributes: round-trippable decimal form,
/// but avoiding `-0` and tiny float noise from our own calculations.
pub fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }

    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    let s = v.to_string();
    if s == "-0" { "0".to_string() } else { s }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_num_drops_noise_and_negative_zero() {
        assert_eq!(fmt_num(10.000000001), "10");
        assert_eq!(fmt_num(-0.0), "0");
        assert_eq!(fmt_num(2.5), "2.5");
        assert_eq!(fmt_num(f64::NAN), "0");
    }

    #[test]
    fn leading_slash_asset_path_gets_origin() {
        let options = SvgExportOptions {
            asset_path: Some("/assets/fonts/".to_string()),
            origin: Some("https://board.example".to_string()),
        };
        assert_eq!(
            resolve_asset_path(&options),
            "https://board.example/assets/fonts/"
        );
    }

    #[test]
    fn hosted_asset_path_is_untouched() {
        let options = SvgExportOptions {
            asset_path: Some("https://cdn.example/fonts/".to_string()),
            origin: Some("https://board.example".to_string()),
        };
        assert_eq!(resolve_asset_path(&options), "https://cdn.example/fonts/");
    }

    #[test]
    fn default_asset_path_is_version_pinned() {
        let path = resolve_asset_path(&SvgExportOptions::default());
        assert!(path.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn empty_node_self_closes() {
        let mut out = String::new();
        SvgNode::new("rect").attr_num("width", 4.0).write_to(&mut out);
        assert_eq!(out, r#"<rect width="4"/>"#);
    }

    #[test]
    fn text_and_attrs_are_escaped() {
        let mut out = String::new();
        SvgNode::new("text")
            .attr("data-label", "a<b")
            .text("x & y")
            .write_to(&mut out);
        assert_eq!(out, r#"<text data-label="a&lt;b">x &amp; y</text>"#);
    }
}
