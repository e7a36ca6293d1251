use scrawl_scene::Element;
use scrawl_scene::geom::Rect;

/// Padded axis-aligned bounding box of an element set.
///
/// `min_x`/`min_y` are the *tight* minima (pre-padding) so the render offset
/// is `-min + padding`; `width`/`height` already include padding on every
/// side and are therefore always at least `2 * padding`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

/// Tight common bounds of all live (non-deleted) elements, or `None` when the
/// set is empty.
pub fn common_bounds(elements: &[Element]) -> Option<Rect> {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    let mut seen = false;

    for el in elements {
        if el.is_deleted {
            continue;
        }
        let r = el.aabb();
        min_x = min_x.min(r.origin.x);
        min_y = min_y.min(r.origin.y);
        max_x = max_x.max(r.origin.x + r.size.width);
        max_y = max_y.max(r.origin.y + r.size.height);
        seen = true;
    }

    seen.then(|| scrawl_scene::geom::rect(min_x, min_y, max_x - min_x, max_y - min_y))
}

/// Computes the padded export box. Pure; an empty element set yields a
/// zero-extent box at the origin plus padding rather than an error.
pub fn export_bounds(elements: &[Element], padding: f64) -> ExportBounds {
    let tight = common_bounds(elements)
        .unwrap_or_else(|| scrawl_scene::geom::rect(0.0, 0.0, 0.0, 0.0));

    ExportBounds {
        min_x: tight.origin.x,
        min_y: tight.origin.y,
        width: tight.size.width + padding * 2.0,
        height: tight.size.height + padding * 2.0,
    }
}

/// Output dimensions for a given padding and scale, without performing a full
/// export. Matches the vector document's intrinsic size times `scale`,
/// truncated to integers.
pub fn get_export_size(elements: &[Element], padding: f64, scale: f64) -> (u32, u32) {
    let bounds = export_bounds(elements, padding);
    (
        (bounds.width * scale).trunc() as u32,
        (bounds.height * scale).trunc() as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrawl_scene::{Element, ElementKind};

    fn rect_el(id: &str, x: f64, y: f64, w: f64, h: f64) -> Element {
        Element::new(id, ElementKind::Rectangle, x, y, w, h)
    }

    #[test]
    fn padded_box_contains_every_element() {
        let elements = vec![
            rect_el("a", -20.0, 5.0, 40.0, 10.0),
            rect_el("b", 100.0, -50.0, 10.0, 200.0),
        ];
        let padding = 16.0;
        let b = export_bounds(&elements, padding);

        assert!(b.width >= padding * 2.0);
        assert!(b.height >= padding * 2.0);
        let max_x = b.min_x + (b.width - padding * 2.0);
        let max_y = b.min_y + (b.height - padding * 2.0);
        for el in &elements {
            let r = el.aabb();
            assert!(r.origin.x >= b.min_x);
            assert!(r.origin.y >= b.min_y);
            assert!(r.origin.x + r.size.width <= max_x + 1e-9);
            assert!(r.origin.y + r.size.height <= max_y + 1e-9);
        }
    }

    #[test]
    fn empty_set_yields_padding_only_box() {
        let b = export_bounds(&[], 10.0);
        assert_eq!(b.min_x, 0.0);
        assert_eq!(b.min_y, 0.0);
        assert_eq!(b.width, 20.0);
        assert_eq!(b.height, 20.0);
    }

    #[test]
    fn zero_size_element_still_gets_padding() {
        let b = export_bounds(&[rect_el("p", 7.0, 9.0, 0.0, 0.0)], 5.0);
        assert_eq!(b.min_x, 7.0);
        assert_eq!(b.min_y, 9.0);
        assert_eq!(b.width, 10.0);
        assert_eq!(b.height, 10.0);
    }

    #[test]
    fn deleted_elements_are_ignored() {
        let mut dead = rect_el("dead", -1000.0, -1000.0, 5.0, 5.0);
        dead.is_deleted = true;
        let b = export_bounds(&[dead, rect_el("live", 0.0, 0.0, 10.0, 10.0)], 0.0);
        assert_eq!(b.min_x, 0.0);
        assert_eq!(b.min_y, 0.0);
        assert_eq!(b.width, 10.0);
        assert_eq!(b.height, 10.0);
    }

    #[test]
    fn export_size_truncates() {
        let elements = vec![rect_el("a", 0.0, 0.0, 100.0, 50.0)];
        // 110.0 * 1.5 = 165.0, 60.0 * 1.5 = 90.0
        assert_eq!(get_export_size(&elements, 5.0, 1.5), (165, 90));
        // 101.0 * 0.5 = 50.5 -> 50
        let odd = vec![rect_el("a", 0.0, 0.0, 101.0, 51.0)];
        assert_eq!(get_export_size(&odd, 0.0, 0.5), (50, 25));
    }
}
