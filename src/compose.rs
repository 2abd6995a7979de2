use image::RgbaImage;

use crate::canvas::{Canvas, RoundedRect};
use crate::options::LogoStyle;

/// What gets drawn on top of the QR code.
#[derive(Debug, Clone, Copy)]
pub enum ComposeTarget<'a> {
    Plain,
    WithLogo(&'a RgbaImage, &'a LogoStyle),
}

/// Draws `qr` scaled to a `size × size` surface, then the logo (if any)
/// centered on it.
pub fn compose(qr: &RgbaImage, size: u32, target: ComposeTarget<'_>) -> RgbaImage {
    let mut canvas = Canvas::new(size, size);
    canvas.draw_image(qr, 0.0, 0.0, size as f32, size as f32);

    let ComposeTarget::WithLogo(logo, style) = target else {
        return canvas.into_image();
    };

    draw_logo(&mut canvas, logo, style);
    canvas.into_image()
}

fn draw_logo(canvas: &mut Canvas, logo: &RgbaImage, style: &LogoStyle) {
    let size = canvas.width() as f32;
    let x = (size - style.width) / 2.0;
    let y = (size - style.height) / 2.0;

    if let Some(background) = style.background {
        let backdrop = RoundedRect::new(
            x - style.margin,
            y - style.margin,
            style.width + style.margin * 2.0,
            style.height + style.margin * 2.0,
            style.radius,
        );
        canvas.fill(&backdrop, background);
    }

    let mut layer = canvas.save();
    layer.set_global_alpha(style.opacity);
    if style.radius > 0.0 {
        layer.clip(RoundedRect::new(x, y, style.width, style.height, style.radius));
    }
    layer.draw_image(logo, x, y, style.width, style.height);
}
