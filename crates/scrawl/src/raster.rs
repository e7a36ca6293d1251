#![forbid(unsafe_code)]

//! Raster export pipeline: resolves pixel dimensions and scroll offset under
//! the sizing-policy precedence, allocates a pixmap, warms the image cache,
//! and invokes the shape renderer once with a fully resolved transform.

use base64::Engine as _;
use rustc_hash::FxHashMap;
use scrawl_export::bounds::export_bounds;
use scrawl_export::sizing::{self, DimensionResolver, SizingOptions};
use scrawl_scene::{
    AppState, AppStateOverrides, BinaryFiles, Element, ElementKind, FileId, Theme,
    restore_app_state,
};

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("invalid data URL for file {file_id}")]
    InvalidDataUrl { file_id: FileId },
    #[error("failed to decode image data for file {file_id}")]
    ImageDecode { file_id: FileId },
    #[error("failed to encode PNG")]
    PngEncode,
    #[error(transparent)]
    Export(#[from] scrawl_export::Error),
}

pub type Result<T> = std::result::Result<T, RasterError>;

/// Decoded image payload, keyed by file id in the per-export [`ImageCache`].
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub mime_type: String,
    pub pixmap: tiny_skia::Pixmap,
}

/// Per-export mapping from file id to decoded image data. Owned by the call,
/// never shared across exports.
pub type ImageCache = FxHashMap<FileId, DecodedImage>;

/// Fully resolved render configuration handed to the shape renderer. UI-only
/// chrome is forced off and the export flag on; the renderer skips
/// interactive-only decorations accordingly.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// `None` means transparent (background export disabled).
    pub canvas_background_color: Option<String>,
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub scale: f64,
    pub zoom: f64,
    pub theme: Theme,
    pub image_cache: ImageCache,
    pub is_exporting: bool,
    pub render_grid: bool,
    pub render_scrollbars: bool,
    pub render_selection: bool,
}

/// External shape renderer for the pixel target. Applies the transform in
/// [`RenderConfig`] uniformly to every element in a single pass.
pub trait RasterRenderer {
    fn render(
        &self,
        elements: &[Element],
        app_state: &AppState,
        surface: &mut tiny_skia::Pixmap,
        config: &RenderConfig,
    ) -> scrawl_export::Result<()>;
}

/// Surface allocation strategy. The default allocates a `tiny-skia` pixmap.
pub trait SurfaceFactory {
    fn create_surface(&self, width: u32, height: u32) -> Result<tiny_skia::Pixmap>;
}

pub struct PixmapFactory;

impl SurfaceFactory for PixmapFactory {
    fn create_surface(&self, width: u32, height: u32) -> Result<tiny_skia::Pixmap> {
        tiny_skia::Pixmap::new(width, height).ok_or(RasterError::PixmapAlloc)
    }
}

/// Image-cache population strategy. A file id missing from the file map is
/// skipped (no cache entry, not an error); a decode failure aborts the export.
pub trait ImageLoader {
    fn populate(&self, file_ids: &[FileId], files: &BinaryFiles) -> Result<ImageCache>;
}

/// Default loader: decodes base64 data URLs via `image` into premultiplied
/// RGBA pixmaps.
pub struct DataUrlImageLoader;

impl ImageLoader for DataUrlImageLoader {
    fn populate(&self, file_ids: &[FileId], files: &BinaryFiles) -> Result<ImageCache> {
        let mut cache = ImageCache::default();
        for id in file_ids {
            if cache.contains_key(id) {
                continue;
            }
            let Some(file) = files.get(id) else {
                continue;
            };
            let bytes =
                decode_data_url(&file.data_url).ok_or_else(|| RasterError::InvalidDataUrl {
                    file_id: id.clone(),
                })?;
            let decoded =
                image::load_from_memory(&bytes).map_err(|_| RasterError::ImageDecode {
                    file_id: id.clone(),
                })?;
            let pixmap =
                rgba_to_pixmap(decoded.into_rgba8()).ok_or_else(|| RasterError::ImageDecode {
                    file_id: id.clone(),
                })?;
            cache.insert(
                id.clone(),
                DecodedImage {
                    mime_type: file.mime_type.clone(),
                    pixmap,
                },
            );
        }
        Ok(cache)
    }
}

fn decode_data_url(data_url: &str) -> Option<Vec<u8>> {
    let rest = data_url.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    if !meta.ends_with(";base64") {
        return None;
    }
    base64::engine::general_purpose::STANDARD.decode(payload).ok()
}

fn rgba_to_pixmap(rgba: image::RgbaImage) -> Option<tiny_skia::Pixmap> {
    let (width, height) = rgba.dimensions();
    let mut data = rgba.into_raw();
    // tiny-skia stores premultiplied alpha; `image` decodes straight alpha.
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        px[0] = ((u16::from(px[0]) * a) / 255) as u8;
        px[1] = ((u16::from(px[1]) * a) / 255) as u8;
        px[2] = ((u16::from(px[2]) * a) / 255) as u8;
    }
    tiny_skia::Pixmap::from_vec(data, tiny_skia::IntSize::from_wh(width, height)?)
}

/// Optional strategy hooks for a raster export. All default to the built-in
/// behavior when unset.
#[derive(Default)]
pub struct RasterHooks<'a> {
    pub surface_factory: Option<&'a dyn SurfaceFactory>,
    pub dimension_resolver: Option<&'a dyn DimensionResolver>,
    pub image_loader: Option<&'a dyn ImageLoader>,
}

/// Sizing and theme options for a raster export. See
/// [`scrawl_export::sizing::resolve`] for how conflicting fields are settled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterExportOptions {
    pub max_width_or_height: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub scale: f64,
    pub x: Option<f64>,
    pub y: Option<f64>,
    /// Explicit theme; falls back to the dark-mode export flag, then light.
    pub theme: Option<Theme>,
}

impl Default for RasterExportOptions {
    fn default() -> Self {
        Self {
            max_width_or_height: None,
            width: None,
            height: None,
            scale: 1.0,
            x: None,
            y: None,
            theme: None,
        }
    }
}

/// Raster export with default hooks.
pub fn export_to_canvas_sync(
    elements: &[Element],
    overrides: &AppStateOverrides,
    files: &BinaryFiles,
    options: &RasterExportOptions,
    renderer: &dyn RasterRenderer,
) -> Result<tiny_skia::Pixmap> {
    export_to_canvas_sync_with(
        elements,
        overrides,
        files,
        options,
        renderer,
        &RasterHooks::default(),
    )
}

/// Executor-free async wrapper around [`export_to_canvas_sync`].
pub async fn export_to_canvas(
    elements: &[Element],
    overrides: &AppStateOverrides,
    files: &BinaryFiles,
    options: &RasterExportOptions,
    renderer: &dyn RasterRenderer,
) -> Result<tiny_skia::Pixmap> {
    export_to_canvas_sync(elements, overrides, files, options, renderer)
}

/// Raster export pipeline.
///
/// Restores the application state, resolves geometry and the sizing-policy
/// precedence, allocates the surface at the integer-rounded dimensions, warms
/// the image cache, and invokes the renderer once. Degenerate geometry (no
/// elements) is not an error: it yields a minimal padded surface.
pub fn export_to_canvas_sync_with(
    elements: &[Element],
    overrides: &AppStateOverrides,
    files: &BinaryFiles,
    options: &RasterExportOptions,
    renderer: &dyn RasterRenderer,
    hooks: &RasterHooks<'_>,
) -> Result<tiny_skia::Pixmap> {
    let app_state = restore_app_state(overrides);
    let padding = app_state.export_padding;

    let bounds = export_bounds(elements, padding);
    let sizing = sizing::resolve(
        &bounds,
        padding,
        &SizingOptions {
            max_width_or_height: options.max_width_or_height,
            width: options.width,
            height: options.height,
            scale: options.scale,
            x: options.x,
            y: options.y,
        },
        hooks.dimension_resolver,
    );

    let width = sizing.width.round().max(1.0) as u32;
    let height = sizing.height.round().max(1.0) as u32;
    let mut surface = match hooks.surface_factory {
        Some(factory) => factory.create_surface(width, height)?,
        None => PixmapFactory.create_surface(width, height)?,
    };

    let file_ids: Vec<FileId> = elements
        .iter()
        .filter(|el| !el.is_deleted && el.kind == ElementKind::Image)
        .filter_map(|el| el.file_id.clone())
        .collect();
    let image_cache = match hooks.image_loader {
        Some(loader) => loader.populate(&file_ids, files)?,
        None => DataUrlImageLoader.populate(&file_ids, files)?,
    };

    let theme = options.theme.unwrap_or(if app_state.export_with_dark_mode {
        Theme::Dark
    } else {
        Theme::Light
    });

    let config = RenderConfig {
        canvas_background_color: app_state
            .export_background
            .then(|| app_state.view_background_color.clone()),
        scroll_x: sizing.scroll_x,
        scroll_y: sizing.scroll_y,
        scale: sizing.scale,
        zoom: AppState::default().zoom,
        theme,
        image_cache,
        is_exporting: true,
        render_grid: false,
        render_scrollbars: false,
        render_selection: false,
    };

    renderer.render(elements, &app_state.for_export_surface(), &mut surface, &config)?;
    Ok(surface)
}

/// Raster export encoded as PNG bytes.
pub fn export_to_png_sync(
    elements: &[Element],
    overrides: &AppStateOverrides,
    files: &BinaryFiles,
    options: &RasterExportOptions,
    renderer: &dyn RasterRenderer,
) -> Result<Vec<u8>> {
    let surface = export_to_canvas_sync(elements, overrides, files, options, renderer)?;
    surface.encode_png().map_err(|_| RasterError::PngEncode)
}

/// Executor-free async wrapper around [`export_to_png_sync`].
pub async fn export_to_png(
    elements: &[Element],
    overrides: &AppStateOverrides,
    files: &BinaryFiles,
    options: &RasterExportOptions,
    renderer: &dyn RasterRenderer,
) -> Result<Vec<u8>> {
    export_to_png_sync(elements, overrides, files, options, renderer)
}

/// Renderer that strokes plain element outlines over the background fill.
/// A stand-in for a full sketch renderer, useful for tests and smoke checks.
pub struct OutlineRasterRenderer;

impl RasterRenderer for OutlineRasterRenderer {
    fn render(
        &self,
        elements: &[Element],
        _app_state: &AppState,
        surface: &mut tiny_skia::Pixmap,
        config: &RenderConfig,
    ) -> scrawl_export::Result<()> {
        if let Some(bg) = config.canvas_background_color.as_deref() {
            if let Some(color) = parse_color(bg) {
                surface.fill(color);
            }
        }

        let mut paint = tiny_skia::Paint::default();
        let (r, g, b) = match config.theme {
            Theme::Dark => (227, 227, 232),
            Theme::Light => (30, 30, 30),
        };
        paint.set_color_rgba8(r, g, b, 255);
        paint.anti_alias = true;
        let stroke = tiny_skia::Stroke {
            width: 1.0,
            ..tiny_skia::Stroke::default()
        };

        let transform = tiny_skia::Transform::from_row(
            config.scale as f32,
            0.0,
            0.0,
            config.scale as f32,
            (config.scroll_x * config.scale) as f32,
            (config.scroll_y * config.scale) as f32,
        );

        for el in elements {
            if el.is_deleted {
                continue;
            }
            let Some(rect) = tiny_skia::Rect::from_xywh(
                el.x as f32,
                el.y as f32,
                (el.width as f32).max(0.001),
                (el.height as f32).max(0.001),
            ) else {
                continue;
            };
            let path = match el.kind {
                ElementKind::Ellipse => tiny_skia::PathBuilder::from_oval(rect),
                _ => Some(tiny_skia::PathBuilder::from_rect(rect)),
            };
            let Some(path) = path else {
                continue;
            };
            let transform = if el.angle != 0.0 {
                let cx = (el.x + el.width / 2.0) as f32;
                let cy = (el.y + el.height / 2.0) as f32;
                transform.pre_concat(tiny_skia::Transform::from_rotate_at(
                    el.angle.to_degrees() as f32,
                    cx,
                    cy,
                ))
            } else {
                transform
            };
            surface.stroke_path(&path, &paint, &stroke, transform, None);
        }
        Ok(())
    }
}

/// Parses the few color forms exports deal in: `transparent`, a couple of
/// CSS names, and 3/4/6/8-digit hex.
pub fn parse_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => return Some(tiny_skia::Color::from_rgba8(255, 255, 255, 255)),
        "black" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 255)),
        _ => {}
    }

    let hex = s.strip_prefix('#')?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let widen = |v: u32| ((v << 4) | v) as u8;
    match hex.len() {
        3 | 4 => {
            let v = u32::from_str_radix(hex, 16).ok()?;
            let (rgb, a) = if hex.len() == 4 {
                (v >> 4, widen(v & 0xf))
            } else {
                (v, 255)
            };
            Some(tiny_skia::Color::from_rgba8(
                widen((rgb >> 8) & 0xf),
                widen((rgb >> 4) & 0xf),
                widen(rgb & 0xf),
                a,
            ))
        }
        6 | 8 => {
            let v = u32::from_str_radix(hex, 16).ok()?;
            let (rgb, a) = if hex.len() == 8 {
                (v >> 8, (v & 0xff) as u8)
            } else {
                (v, 255)
            };
            Some(tiny_skia::Color::from_rgba8(
                ((rgb >> 16) & 0xff) as u8,
                ((rgb >> 8) & 0xff) as u8,
                (rgb & 0xff) as u8,
                a,
            ))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_color_named_and_hex() {
        assert_eq!(parse_color("transparent").unwrap().alpha(), 0.0);
        assert_eq!(parse_color("#fff"), parse_color("#ffffff"));
        assert_eq!(parse_color("#ffffffff"), parse_color("white"));
        let c = parse_color("#12345678").unwrap();
        assert!((c.alpha() - 120.0 / 255.0).abs() < 1e-6);
        assert!(parse_color("#12345").is_none());
        assert!(parse_color("not-a-color").is_none());
    }

    #[test]
    fn data_url_decoding_rejects_non_base64() {
        assert!(decode_data_url("data:image/svg+xml,<svg/>").is_none());
        assert!(decode_data_url("nonsense").is_none());
        let ok = decode_data_url("data:image/png;base64,AAECAw==").unwrap();
        assert_eq!(ok, vec![0, 1, 2, 3]);
    }
}
