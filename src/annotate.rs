//! Rectangles marking final detections, and optional rendering onto the
//! target.

use crate::consolidate::Detection;

/// Template-sized rectangle to draw for a detection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Annotation {
    /// Left edge in target pixels.
    pub x: usize,
    /// Top edge in target pixels.
    pub y: usize,
    /// Rectangle width.
    pub width: usize,
    /// Rectangle height.
    pub height: usize,
    /// Score of the detection.
    pub score: f32,
}

/// One template-sized rectangle per detection, in input order.
pub fn annotations(
    detections: &[Detection],
    template_width: usize,
    template_height: usize,
) -> Vec<Annotation> {
    detections
        .iter()
        .map(|d| Annotation {
            x: d.x,
            y: d.y,
            width: template_width,
            height: template_height,
            score: d.score,
        })
        .collect()
}

/// Default outline thickness in pixels.
pub const DEFAULT_THICKNESS: u32 = 5;

/// Outline color (blue).
pub const ANNOTATION_COLOR: [u8; 3] = [0, 0, 255];

/// Draws hollow rectangles onto a copy of `target`.
///
/// The outline grows inwards from the rectangle edge by `thickness` pixels;
/// rectangles partly outside the image are clipped.
#[cfg(feature = "image-io")]
pub fn render_annotations(
    target: &crate::image::ColorImage,
    annotations: &[Annotation],
    thickness: u32,
) -> crate::util::SymbolScanResult<image::RgbImage> {
    use imageproc::drawing::draw_hollow_rect_mut;
    use imageproc::rect::Rect;

    let mut canvas = crate::image::io::rgb_image_from_color(target)?;
    let color = image::Rgb(ANNOTATION_COLOR);
    for a in annotations {
        for inset in 0..thickness {
            let w = (a.width as u32).saturating_sub(2 * inset);
            let h = (a.height as u32).saturating_sub(2 * inset);
            if w == 0 || h == 0 {
                break;
            }
            let rect = Rect::at(a.x as i32 + inset as i32, a.y as i32 + inset as i32).of_size(w, h);
            draw_hollow_rect_mut(&mut canvas, rect, color);
        }
    }
    Ok(canvas)
}
