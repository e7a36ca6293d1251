use scrawl_export::svg::export_to_svg_sync_with;
use scrawl_export::{
    OutlineSvgRenderer, SceneSerializer, SvgExportOptions, export_to_svg, export_to_svg_sync,
    get_export_size,
};
use scrawl_scene::{
    AppState, AppStateOverrides, BinaryFiles, Element, ElementKind, SerializeScope,
    restore_app_state,
};

fn scene() -> Vec<Element> {
    vec![
        Element::new("r1", ElementKind::Rectangle, 20.0, 30.0, 300.0, 100.0),
        Element::new("e1", ElementKind::Ellipse, -40.0, 10.0, 80.0, 80.0),
    ]
}

fn state() -> AppState {
    restore_app_state(&AppStateOverrides::default())
}

#[test]
fn view_box_matches_export_size_query() {
    let elements = scene();
    let state = state();
    let doc = export_to_svg_sync(
        &elements,
        &state,
        &BinaryFiles::default(),
        &SvgExportOptions::default(),
        &OutlineSvgRenderer,
    )
    .unwrap();

    let (w, h) = get_export_size(&elements, state.export_padding, 1.0);
    assert_eq!(doc.view_box_width().trunc() as u32, w);
    assert_eq!(doc.view_box_height().trunc() as u32, h);
}

#[test]
fn repeated_export_is_byte_identical() {
    let elements = scene();
    let state = state();
    let export = || {
        export_to_svg_sync(
            &elements,
            &state,
            &BinaryFiles::default(),
            &SvgExportOptions::default(),
            &OutlineSvgRenderer,
        )
        .unwrap()
        .to_svg_string()
    };
    assert_eq!(export(), export());
}

#[test]
fn background_rect_precedes_content() {
    let doc = export_to_svg_sync(
        &scene(),
        &state(),
        &BinaryFiles::default(),
        &SvgExportOptions::default(),
        &OutlineSvgRenderer,
    )
    .unwrap();
    let text = doc.to_svg_string();

    let bg = text.find(r##"fill="#ffffff""##).expect("background rect");
    let content = text.find(r#"class="outlines""#).expect("renderer output");
    assert!(bg < content);
}

#[test]
fn disabled_background_omits_rect() {
    let mut state = state();
    state.export_background = false;
    let doc = export_to_svg_sync(
        &scene(),
        &state,
        &BinaryFiles::default(),
        &SvgExportOptions::default(),
        &OutlineSvgRenderer,
    )
    .unwrap();
    assert!(!doc.to_svg_string().contains(r##"fill="#ffffff""##));
}

#[test]
fn dark_mode_sets_theme_filter() {
    let mut state = state();
    state.export_with_dark_mode = true;
    let doc = export_to_svg_sync(
        &scene(),
        &state,
        &BinaryFiles::default(),
        &SvgExportOptions::default(),
        &OutlineSvgRenderer,
    )
    .unwrap();
    assert_eq!(
        doc.root().get_attr("filter"),
        Some(scrawl_export::svg::THEME_FILTER)
    );
}

#[test]
fn export_scale_affects_physical_size_not_view_box() {
    let mut state = state();
    state.export_scale = 2.0;
    let elements = scene();
    let doc = export_to_svg_sync(
        &elements,
        &state,
        &BinaryFiles::default(),
        &SvgExportOptions::default(),
        &OutlineSvgRenderer,
    )
    .unwrap();

    let unscaled = export_to_svg_sync(
        &elements,
        &state_with_scale(1.0),
        &BinaryFiles::default(),
        &SvgExportOptions::default(),
        &OutlineSvgRenderer,
    )
    .unwrap();

    assert_eq!(doc.view_box_width(), unscaled.view_box_width());
    let w: f64 = doc.root().get_attr("width").unwrap().parse().unwrap();
    let uw: f64 = unscaled.root().get_attr("width").unwrap().parse().unwrap();
    assert_eq!(w, uw * 2.0);
}

fn state_with_scale(scale: f64) -> AppState {
    let mut s = state();
    s.export_scale = scale;
    s
}

#[test]
fn embedded_scene_metadata_is_present() {
    let mut state = state();
    state.export_embed_scene = true;
    let doc = export_to_svg_sync(
        &scene(),
        &state,
        &BinaryFiles::default(),
        &SvgExportOptions::default(),
        &OutlineSvgRenderer,
    )
    .unwrap();
    let text = doc.to_svg_string();
    assert!(text.contains("<metadata"));
    assert!(text.contains("application/vnd.scrawl+json;base64"));
}

struct FailingSerializer;

impl SceneSerializer for FailingSerializer {
    fn serialize(
        &self,
        _elements: &[Element],
        _app_state: &AppState,
        _files: &BinaryFiles,
        _scope: SerializeScope,
    ) -> serde_json::Result<String> {
        Err(serde_json::from_str::<serde_json::Value>("{").unwrap_err())
    }
}

#[test]
fn metadata_failure_does_not_abort_export() {
    let mut state = state();
    state.export_embed_scene = true;
    let elements = scene();
    let doc = export_to_svg_sync_with(
        &elements,
        &state,
        &BinaryFiles::default(),
        &SvgExportOptions::default(),
        &OutlineSvgRenderer,
        &FailingSerializer,
    )
    .unwrap();

    let text = doc.to_svg_string();
    assert!(!text.contains("<metadata"));
    // Document structure is otherwise intact.
    let (w, _) = get_export_size(&elements, state.export_padding, 1.0);
    assert_eq!(doc.view_box_width().trunc() as u32, w);
    assert!(text.contains(r#"class="outlines""#));
    assert!(text.contains(r##"fill="#ffffff""##));
}

#[test]
fn empty_scene_exports_padding_only_document() {
    let state = state();
    let doc = export_to_svg_sync(
        &[],
        &state,
        &BinaryFiles::default(),
        &SvgExportOptions::default(),
        &OutlineSvgRenderer,
    )
    .unwrap();
    assert_eq!(doc.view_box_width(), state.export_padding * 2.0);
    assert_eq!(doc.view_box_height(), state.export_padding * 2.0);
}

#[test]
fn async_wrapper_matches_sync() {
    let elements = scene();
    let state = state();
    let sync = export_to_svg_sync(
        &elements,
        &state,
        &BinaryFiles::default(),
        &SvgExportOptions::default(),
        &OutlineSvgRenderer,
    )
    .unwrap();
    let wrapped = futures::executor::block_on(export_to_svg(
        &elements,
        &state,
        &BinaryFiles::default(),
        &SvgExportOptions::default(),
        &OutlineSvgRenderer,
    ))
    .unwrap();
    assert_eq!(sync.to_svg_string(), wrapped.to_svg_string());
}
