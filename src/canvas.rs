//! A small software drawing surface with just enough of a 2D canvas API to
//! composite a logo onto a QR code: source-over blending, a global alpha,
//! rounded-rectangle fills and clips, and a scoped save/restore.

use image::{Rgba, RgbaImage};
use std::ops::{Deref, DerefMut};

// Subsamples per axis when computing pixel coverage of a shape edge.
const SUPERSAMPLE: u32 = 4;

/// An axis-aligned rectangle with uniformly rounded corners.
///
/// The outline is the path that starts at `(x + r, y)`, runs along each edge
/// and turns each corner with an arc of radius `r` before closing back at the
/// start. A radius of zero gives a plain rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedRect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    radius: f32,
}

impl RoundedRect {
    /// The radius is clamped to half of the smaller side so the corner arcs
    /// never overlap.
    pub fn new(x: f32, y: f32, width: f32, height: f32, radius: f32) -> Self {
        let width = width.max(0.0);
        let height = height.max(0.0);
        let radius = radius.max(0.0).min(width / 2.0).min(height / 2.0);
        Self {
            x,
            y,
            width,
            height,
            radius,
        }
    }

    pub fn sharp(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, width, height, 0.0)
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        let right = self.x + self.width;
        let bottom = self.y + self.height;
        if px < self.x || px >= right || py < self.y || py >= bottom {
            return false;
        }
        if self.radius <= 0.0 {
            return true;
        }

        // Distance to the nearest point of the inner rectangle that the
        // corner arcs are centered on.
        let r = self.radius;
        let cx = px.max(self.x + r).min(right - r);
        let cy = py.max(self.y + r).min(bottom - r);
        let (dx, dy) = (px - cx, py - cy);
        dx * dx + dy * dy <= r * r
    }

    /// Pixel columns and rows touched by the shape, clipped to `width × height`.
    fn pixel_bounds(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let clamp = |v: f32, max: u32| -> u32 { (v.max(0.0) as u32).min(max) };
        let x0 = clamp(self.x.floor(), width);
        let y0 = clamp(self.y.floor(), height);
        let x1 = clamp((self.x + self.width).ceil(), width);
        let y1 = clamp((self.y + self.height).ceil(), height);
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }
}

#[derive(Debug, Clone)]
struct State {
    global_alpha: f32,
    clips: Vec<RoundedRect>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            global_alpha: 1.0,
            clips: Vec::new(),
        }
    }
}

pub struct Canvas {
    pixels: RgbaImage,
    state: State,
    saved: Vec<State>,
}

impl Canvas {
    /// Creates a fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            state: State::default(),
            saved: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[cfg(test)]
    fn global_alpha(&self) -> f32 {
        self.state.global_alpha
    }

    #[cfg(test)]
    fn has_clip(&self) -> bool {
        !self.state.clips.is_empty()
    }

    /// Pushes the current alpha and clip. They are restored when the
    /// returned guard is dropped, on every exit path.
    pub fn save(&mut self) -> CanvasGuard<'_> {
        self.saved.push(self.state.clone());
        CanvasGuard { canvas: self }
    }

    fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    /// Values outside `0..=1` are ignored.
    pub fn set_global_alpha(&mut self, alpha: f32) {
        if (0.0..=1.0).contains(&alpha) {
            self.state.global_alpha = alpha;
        }
    }

    /// Intersects the clip region with `shape`.
    pub fn clip(&mut self, shape: RoundedRect) {
        self.state.clips.push(shape);
    }

    pub fn fill(&mut self, shape: &RoundedRect, color: Rgba<u8>) {
        let Some((x0, y0, x1, y1)) = shape.pixel_bounds(self.width(), self.height()) else {
            return;
        };
        let alpha = color[3] as f32 / 255.0;
        let premultiplied = [
            color[0] as f32 / 255.0 * alpha,
            color[1] as f32 / 255.0 * alpha,
            color[2] as f32 / 255.0 * alpha,
            alpha,
        ];

        for py in y0..y1 {
            for px in x0..x1 {
                let coverage = self.coverage(px, py, shape);
                if coverage > 0.0 {
                    self.blend(px, py, premultiplied, coverage * self.state.global_alpha);
                }
            }
        }
    }

    /// Draws `image` scaled into the `width × height` box at `(x, y)`.
    pub fn draw_image(&mut self, image: &RgbaImage, x: f32, y: f32, width: f32, height: f32) {
        if image.width() == 0 || image.height() == 0 {
            return;
        }
        let dest = RoundedRect::sharp(x, y, width, height);
        let Some((x0, y0, x1, y1)) = dest.pixel_bounds(self.width(), self.height()) else {
            return;
        };
        let scale_x = image.width() as f32 / dest.width;
        let scale_y = image.height() as f32 / dest.height;

        for py in y0..y1 {
            for px in x0..x1 {
                let coverage = self.coverage(px, py, &dest);
                if coverage <= 0.0 {
                    continue;
                }
                let u = (px as f32 + 0.5 - x) * scale_x;
                let v = (py as f32 + 0.5 - y) * scale_y;
                let source = sample_bilinear(image, u, v);
                self.blend(px, py, source, coverage * self.state.global_alpha);
            }
        }
    }

    #[cfg(test)]
    fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    fn coverage(&self, px: u32, py: u32, shape: &RoundedRect) -> f32 {
        let step = 1.0 / SUPERSAMPLE as f32;
        let mut hits = 0u32;
        for sy in 0..SUPERSAMPLE {
            let y = py as f32 + (sy as f32 + 0.5) * step;
            for sx in 0..SUPERSAMPLE {
                let x = px as f32 + (sx as f32 + 0.5) * step;
                if shape.contains(x, y) && self.state.clips.iter().all(|c| c.contains(x, y)) {
                    hits += 1;
                }
            }
        }
        hits as f32 / (SUPERSAMPLE * SUPERSAMPLE) as f32
    }

    /// Source-over blend of a premultiplied color scaled by `amount`.
    fn blend(&mut self, px: u32, py: u32, source: [f32; 4], amount: f32) {
        let src_a = source[3] * amount;
        if src_a <= 0.0 {
            return;
        }
        let dst = self.pixels.get_pixel_mut(px, py);
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }

        for c in 0..3 {
            let dst_p = dst[c] as f32 / 255.0 * dst_a;
            let out_p = source[c] * amount + dst_p * (1.0 - src_a);
            dst[c] = to_u8(out_p / out_a);
        }
        dst[3] = to_u8(out_a);
    }
}

pub struct CanvasGuard<'a> {
    canvas: &'a mut Canvas,
}

impl Deref for CanvasGuard<'_> {
    type Target = Canvas;

    fn deref(&self) -> &Canvas {
        self.canvas
    }
}

impl DerefMut for CanvasGuard<'_> {
    fn deref_mut(&mut self) -> &mut Canvas {
        self.canvas
    }
}

impl Drop for CanvasGuard<'_> {
    fn drop(&mut self) {
        self.canvas.restore();
    }
}

fn to_u8(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Bilinear sample at continuous coordinates `(u, v)`, where pixel `(i, j)`
/// has its center at `(i + 0.5, j + 0.5)`. Returns a premultiplied color.
fn sample_bilinear(image: &RgbaImage, u: f32, v: f32) -> [f32; 4] {
    let max_x = image.width() as i64 - 1;
    let max_y = image.height() as i64 - 1;
    let fx = u - 0.5;
    let fy = v - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;

    let texel = |x: i64, y: i64| -> [f32; 4] {
        let p = image.get_pixel(x.clamp(0, max_x) as u32, y.clamp(0, max_y) as u32);
        let a = p[3] as f32 / 255.0;
        [
            p[0] as f32 / 255.0 * a,
            p[1] as f32 / 255.0 * a,
            p[2] as f32 / 255.0 * a,
            a,
        ]
    };

    let (x0, y0) = (x0 as i64, y0 as i64);
    let samples = [
        (texel(x0, y0), (1.0 - tx) * (1.0 - ty)),
        (texel(x0 + 1, y0), tx * (1.0 - ty)),
        (texel(x0, y0 + 1), (1.0 - tx) * ty),
        (texel(x0 + 1, y0 + 1), tx * ty),
    ];

    let mut out = [0.0f32; 4];
    for (texel, weight) in samples {
        if weight == 0.0 {
            continue;
        }
        for c in 0..4 {
            out[c] += texel[c] * weight;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    #[test]
    fn test_radius_is_clamped_to_half_the_smaller_side() {
        assert_eq!(RoundedRect::new(0.0, 0.0, 20.0, 20.0, 50.0).radius(), 10.0);
        assert_eq!(RoundedRect::new(0.0, 0.0, 40.0, 10.0, 8.0).radius(), 5.0);
        assert_eq!(RoundedRect::new(0.0, 0.0, 40.0, 40.0, 8.0).radius(), 8.0);
        assert_eq!(RoundedRect::new(0.0, 0.0, 40.0, 40.0, -3.0).radius(), 0.0);
    }

    #[test]
    fn test_rounded_rect_contains() {
        let shape = RoundedRect::new(10.0, 10.0, 20.0, 20.0, 5.0);
        assert!(shape.contains(20.0, 20.0));
        assert!(shape.contains(10.5, 20.0));
        // Corner cut away by the arc.
        assert!(!shape.contains(10.2, 10.2));
        assert!(shape.contains(12.0, 12.0));
        assert!(!shape.contains(30.5, 20.0));

        let sharp = RoundedRect::sharp(10.0, 10.0, 20.0, 20.0);
        assert!(sharp.contains(10.2, 10.2));
    }

    #[test]
    fn test_fill_integer_rect_is_exact() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill(&RoundedRect::sharp(0.0, 0.0, 10.0, 10.0), WHITE);
        canvas.fill(&RoundedRect::sharp(2.0, 2.0, 4.0, 4.0), BLACK);

        assert_eq!(canvas.pixel(1, 1), WHITE);
        assert_eq!(canvas.pixel(2, 2), BLACK);
        assert_eq!(canvas.pixel(5, 5), BLACK);
        assert_eq!(canvas.pixel(6, 6), WHITE);
    }

    #[test]
    fn test_global_alpha_blends() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill(&RoundedRect::sharp(0.0, 0.0, 4.0, 4.0), WHITE);
        canvas.set_global_alpha(0.5);
        canvas.fill(&RoundedRect::sharp(0.0, 0.0, 4.0, 4.0), BLACK);

        let p = canvas.pixel(1, 1);
        assert!((127..=128).contains(&p[0]));
        assert_eq!(p[3], 255);
    }

    #[test]
    fn test_guard_restores_state() {
        let mut canvas = Canvas::new(4, 4);
        {
            let mut layer = canvas.save();
            layer.set_global_alpha(0.25);
            layer.clip(RoundedRect::sharp(0.0, 0.0, 2.0, 2.0));
            assert_eq!(layer.global_alpha(), 0.25);
            assert!(layer.has_clip());
        }
        assert_eq!(canvas.global_alpha(), 1.0);
        assert!(!canvas.has_clip());
    }

    #[test]
    fn test_guard_restores_on_early_return() {
        fn draw_then_fail(canvas: &mut Canvas) -> Result<(), &'static str> {
            let mut layer = canvas.save();
            layer.set_global_alpha(0.1);
            Err("draw failed")
        }

        let mut canvas = Canvas::new(2, 2);
        assert!(draw_then_fail(&mut canvas).is_err());
        assert_eq!(canvas.global_alpha(), 1.0);
    }

    #[test]
    fn test_clip_limits_drawing() {
        let mut canvas = Canvas::new(8, 8);
        canvas.fill(&RoundedRect::sharp(0.0, 0.0, 8.0, 8.0), WHITE);
        {
            let mut layer = canvas.save();
            layer.clip(RoundedRect::sharp(0.0, 0.0, 4.0, 8.0));
            layer.fill(&RoundedRect::sharp(0.0, 0.0, 8.0, 8.0), BLACK);
        }
        assert_eq!(canvas.pixel(3, 3), BLACK);
        assert_eq!(canvas.pixel(4, 3), WHITE);
    }

    #[test]
    fn test_draw_image_same_size_is_a_copy() {
        let source = RgbaImage::from_fn(6, 6, |x, y| Rgba([(x * 40) as u8, (y * 40) as u8, 7, 255]));
        let mut canvas = Canvas::new(6, 6);
        canvas.draw_image(&source, 0.0, 0.0, 6.0, 6.0);
        assert_eq!(canvas.into_image(), source);
    }

    #[test]
    fn test_draw_image_scales_into_box() {
        let source = RgbaImage::from_pixel(2, 2, BLACK);
        let mut canvas = Canvas::new(10, 10);
        canvas.fill(&RoundedRect::sharp(0.0, 0.0, 10.0, 10.0), WHITE);
        canvas.draw_image(&source, 2.0, 2.0, 6.0, 6.0);

        assert_eq!(canvas.pixel(1, 1), WHITE);
        assert_eq!(canvas.pixel(2, 2), BLACK);
        assert_eq!(canvas.pixel(7, 7), BLACK);
        assert_eq!(canvas.pixel(8, 8), WHITE);
    }
}
