use image::{GrayImage, Luma};
use imageproc::drawing::draw_line_segment_mut;

use crate::{contour::Contour, hierarchy::{ContourRef, Hierarchy}};

/// Stroke every top-level contour and up to `max_level` levels nested below
/// each one. A contour's color, clamped to `0..=255`, is its stroke value.
pub fn draw_contours(canvas: &mut GrayImage, hierarchy: &Hierarchy, max_level: usize) {
    for root in hierarchy.roots() {
        draw_subtree(canvas, root, max_level);
    }
}

fn draw_subtree(canvas: &mut GrayImage, node: ContourRef<'_>, levels_left: usize) {
    draw_contour(canvas, node.contour());
    if levels_left == 0 {
        return;
    }
    for child in node.children() {
        draw_subtree(canvas, child, levels_left - 1);
    }
}

/// Stroke the closed polygon of one contour.
pub fn draw_contour(canvas: &mut GrayImage, contour: &Contour) {
    let value = Luma([contour.color().clamp(0, 255) as u8]);
    let points = contour.points();
    match points {
        [] => {}
        [only] => {
            let (x, y) = (only.x, only.y);
            if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
                canvas.put_pixel(x as u32, y as u32, value);
            }
        }
        _ => {
            for (i, start) in points.iter().enumerate() {
                let end = points[(i + 1) % points.len()];
                draw_line_segment_mut(
                    canvas,
                    (start.x as f32, start.y as f32),
                    (end.x as f32, end.y as f32),
                    value,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn square(offset: i32, color: i32) -> Contour {
        let mut contour = Contour::from_points(vec![
            Point::new(offset, offset),
            Point::new(offset + 4, offset),
            Point::new(offset + 4, offset + 4),
            Point::new(offset, offset + 4),
        ]);
        contour.set_color(color);
        contour
    }

    #[test]
    fn test_draw_uses_color_and_level() {
        let hierarchy = Hierarchy::from_parents(vec![(square(2, 255), None), (square(10, 128), Some(0))]);

        let mut roots_only = GrayImage::new(20, 20);
        draw_contours(&mut roots_only, &hierarchy, 0);
        assert_eq!(roots_only.get_pixel(2, 2)[0], 255);
        assert_eq!(roots_only.get_pixel(10, 10)[0], 0);

        let mut all = GrayImage::new(20, 20);
        draw_contours(&mut all, &hierarchy, 1);
        assert_eq!(all.get_pixel(14, 10)[0], 128);
        // the interior is not filled
        assert_eq!(all.get_pixel(4, 4)[0], 0);
    }

    #[test]
    fn test_color_is_clamped() {
        let mut canvas = GrayImage::new(4, 4);
        let mut dot = Contour::from_points(vec![Point::new(1, 1)]);
        dot.set_color(1000);
        draw_contour(&mut canvas, &dot);
        assert_eq!(canvas.get_pixel(1, 1)[0], 255);
    }
}
