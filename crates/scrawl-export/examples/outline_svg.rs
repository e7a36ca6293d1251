use scrawl_export::{OutlineSvgRenderer, SvgExportOptions, export_to_svg_sync};
use scrawl_scene::{AppStateOverrides, BinaryFiles, Element, ElementKind, restore_app_state};

fn main() {
    let elements = vec![
        Element::new("title", ElementKind::Text, 40.0, 20.0, 180.0, 30.0),
        Element::new("box", ElementKind::Rectangle, 20.0, 80.0, 220.0, 120.0),
        Element::new("bubble", ElementKind::Ellipse, 300.0, 100.0, 140.0, 90.0),
    ];

    let state = restore_app_state(&AppStateOverrides {
        export_embed_scene: Some(true),
        ..AppStateOverrides::default()
    });

    let doc = export_to_svg_sync(
        &elements,
        &state,
        &BinaryFiles::default(),
        &SvgExportOptions::default(),
        &OutlineSvgRenderer,
    )
    .expect("export svg");

    print!("{}", doc.to_svg_string());
}
