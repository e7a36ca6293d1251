use crate::geom::{Point, Rect, point};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Identifier of a binary file referenced by an image element.
pub type FileId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Ellipse,
    Diamond,
    Freedraw,
    Text,
    Image,
}

/// An immutable drawing primitive on the infinite canvas.
///
/// Elements are opaque to the export pipeline beyond their spatial extent: the
/// shape renderer owns their visual semantics. `width`/`height` may be zero
/// (points, empty text) and `angle` is in radians around the element center.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub is_deleted: bool,
    /// Set on `ElementKind::Image` elements only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<FileId>,
    /// Seed for the sketchy-stroke randomization of the external renderer.
    #[serde(default)]
    pub seed: u64,
}

impl Element {
    pub fn new(id: impl Into<String>, kind: ElementKind, x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            id: id.into(),
            kind,
            x,
            y,
            width: w,
            height: h,
            angle: 0.0,
            is_deleted: false,
            file_id: None,
            seed: 0,
        }
    }

    pub fn center(&self) -> Point {
        point(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Axis-aligned bounding box of the element, accounting for rotation.
    ///
    /// A rotated element contributes the tight box around its rotated corners,
    /// so the union of element boxes always covers every rendered pixel.
    pub fn aabb(&self) -> Rect {
        if self.angle == 0.0 {
            return crate::geom::rect(self.x, self.y, self.width, self.height);
        }

        let c = self.center();
        let (sin, cos) = self.angle.sin_cos();
        let corners = [
            point(self.x, self.y),
            point(self.x + self.width, self.y),
            point(self.x, self.y + self.height),
            point(self.x + self.width, self.y + self.height),
        ];

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in corners {
            let dx = p.x - c.x;
            let dy = p.y - c.y;
            let rx = c.x + dx * cos - dy * sin;
            let ry = c.y + dx * sin + dy * cos;
            min_x = min_x.min(rx);
            min_y = min_y.min(ry);
            max_x = max_x.max(rx);
            max_y = max_y.max(ry);
        }
        crate::geom::rect(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// Binary payload for an image element, stored as a data URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryFileData {
    pub id: FileId,
    pub mime_type: String,
    pub data_url: String,
}

/// File map handed to an export call. Owned by the caller; the export pipeline
/// only reads from it.
pub type BinaryFiles = FxHashMap<FileId, BinaryFileData>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrotated_aabb_matches_extent() {
        let el = Element::new("a", ElementKind::Rectangle, 10.0, 20.0, 30.0, 40.0);
        let r = el.aabb();
        assert_eq!(r.origin.x, 10.0);
        assert_eq!(r.origin.y, 20.0);
        assert_eq!(r.size.width, 30.0);
        assert_eq!(r.size.height, 40.0);
    }

    #[test]
    fn quarter_turn_swaps_extent() {
        let mut el = Element::new("a", ElementKind::Rectangle, 0.0, 0.0, 40.0, 20.0);
        el.angle = std::f64::consts::FRAC_PI_2;
        let r = el.aabb();
        assert!((r.size.width - 20.0).abs() < 1e-9);
        assert!((r.size.height - 40.0).abs() < 1e-9);
        // Rotation is about the element center, so the center must not move.
        assert!((r.origin.x + r.size.width / 2.0 - 20.0).abs() < 1e-9);
        assert!((r.origin.y + r.size.height / 2.0 - 10.0).abs() < 1e-9);
    }
}
