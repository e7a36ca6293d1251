use scrawl::raster::{OutlineRasterRenderer, RasterExportOptions, export_to_png_sync};
use scrawl::{AppStateOverrides, BinaryFiles, Element, ElementKind};
use std::io::Write as _;

fn main() {
    let elements = vec![
        Element::new("card", ElementKind::Rectangle, 0.0, 0.0, 320.0, 200.0),
        Element::new("face", ElementKind::Ellipse, 40.0, 40.0, 80.0, 80.0),
        Element::new("note", ElementKind::Text, 160.0, 60.0, 120.0, 40.0),
    ];

    let bytes = export_to_png_sync(
        &elements,
        &AppStateOverrides::default(),
        &BinaryFiles::default(),
        &RasterExportOptions {
            max_width_or_height: Some(512.0),
            ..RasterExportOptions::default()
        },
        &OutlineRasterRenderer,
    )
    .expect("export png");

    std::io::stdout().write_all(&bytes).expect("write stdout");
}
