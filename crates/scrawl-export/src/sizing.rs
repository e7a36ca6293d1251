use crate::bounds::ExportBounds;

/// Caller hook that may override the natural output dimensions.
///
/// Only consulted in the natural-size branch (no clamp, no explicit width).
/// A returned `scale` replaces the plain scale option and is additionally
/// applied to the scroll offset — and only to the scroll offset.
pub trait DimensionResolver {
    fn resolve(&self, natural_width: f64, natural_height: f64) -> ResolvedDimensions;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDimensions {
    pub width: f64,
    pub height: f64,
    pub scale: Option<f64>,
}

/// Sizing inputs for a raster export. The fields form an ordered precedence,
/// not a free combination: `max_width_or_height` beats `width`/`height`,
/// which beat natural size; `scale` folds into whichever branch is active;
/// `x`/`y` replace the computed scroll offset unconditionally at the end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingOptions {
    pub max_width_or_height: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub scale: f64,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl Default for SizingOptions {
    fn default() -> Self {
        Self {
            max_width_or_height: None,
            width: None,
            height: None,
            scale: 1.0,
            x: None,
            y: None,
        }
    }
}

/// Final surface dimensions plus the transform the renderer applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSizing {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

/// Resolves the sizing-policy precedence over padded natural bounds.
///
/// Exactly one of three branches produces the dimensions:
/// 1. max-dimension clamp: both axes scaled uniformly so the longer side hits
///    the cap, then multiplied by `scale`;
/// 2. explicit width (height derived from the natural aspect ratio when
///    omitted), multiplied by `scale`; the render scale is derived from the
///    width ratio so content fits the requested width;
/// 3. natural size times `scale`, where an optional [`DimensionResolver`] may
///    override the dimensions outright and rescale the scroll offset.
///
/// Conflicting options are not an error; the branch order above settles them.
pub fn resolve(
    bounds: &ExportBounds,
    padding: f64,
    options: &SizingOptions,
    resolver: Option<&dyn DimensionResolver>,
) -> ResolvedSizing {
    let natural_width = bounds.width;
    let natural_height = bounds.height;
    let mut scroll_x = -bounds.min_x + padding;
    let mut scroll_y = -bounds.min_y + padding;

    let (width, height, scale) = if let Some(cap) = options.max_width_or_height {
        let longest = natural_width.max(natural_height);
        let fit = if longest > 0.0 { cap / longest } else { 1.0 };
        let scale = fit * options.scale;
        (natural_width * scale, natural_height * scale, scale)
    } else if let Some(w) = options.width {
        let aspect = if natural_width > 0.0 {
            natural_height / natural_width
        } else {
            1.0
        };
        let h = options.height.unwrap_or(w * aspect);
        let scale = if natural_width > 0.0 {
            w / natural_width * options.scale
        } else {
            options.scale
        };
        (w * options.scale, h * options.scale, scale)
    } else {
        let mut width = natural_width * options.scale;
        let mut height = natural_height * options.scale;
        let mut scale = options.scale;
        if let Some(resolver) = resolver {
            let d = resolver.resolve(natural_width, natural_height);
            width = d.width;
            height = d.height;
            if let Some(s) = d.scale {
                scale = s;
                // The resolver's scale reaches the scroll offset but not the
                // returned dimensions; callers own those verbatim.
                scroll_x *= s;
                scroll_y *= s;
            }
        }
        (width, height, scale)
    };

    if let Some(x) = options.x {
        scroll_x = x;
    }
    if let Some(y) = options.y {
        scroll_y = y;
    }

    ResolvedSizing {
        width,
        height,
        scale,
        scroll_x,
        scroll_y,
    }
}
