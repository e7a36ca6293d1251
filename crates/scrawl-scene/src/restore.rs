use crate::app_state::{AppState, AppStateOverrides};

/// Merges caller overrides over the defaulted application state, producing one
/// immutable resolved state. This runs before any export sizing logic so the
/// pipelines only ever see fully resolved values.
///
/// Non-finite numeric overrides are rejected (the default wins); export scale
/// must additionally be positive.
pub fn restore_app_state(overrides: &AppStateOverrides) -> AppState {
    let base = AppState::default();

    let finite = |v: Option<f64>, fallback: f64| match v {
        Some(v) if v.is_finite() => v,
        _ => fallback,
    };

    let export_scale = match overrides.export_scale {
        Some(s) if s.is_finite() && s > 0.0 => s,
        _ => base.export_scale,
    };

    AppState {
        export_background: overrides.export_background.unwrap_or(base.export_background),
        export_padding: finite(overrides.export_padding, base.export_padding),
        export_scale,
        export_embed_scene: overrides
            .export_embed_scene
            .unwrap_or(base.export_embed_scene),
        export_with_dark_mode: overrides
            .export_with_dark_mode
            .unwrap_or(base.export_with_dark_mode),
        view_background_color: overrides
            .view_background_color
            .clone()
            .unwrap_or(base.view_background_color),
        theme: overrides.theme.unwrap_or(base.theme),
        zoom: finite(overrides.zoom, base.zoom),
        scroll_x: finite(overrides.scroll_x, base.scroll_x),
        scroll_y: finite(overrides.scroll_y, base.scroll_y),
        width: base.width,
        height: base.height,
        offset_left: base.offset_left,
        offset_top: base.offset_top,
    }
}
