use anyhow::Result;
use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::{Rgb888, RgbColor},
    text::{Baseline, Text},
    Drawable, Pixel,
};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::domain::detection::Detection;

pub const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const LABEL_TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

const GLYPH_WIDTH: u32 = 6;
const LABEL_HEIGHT: u32 = 11;

/// Draws one hollow rectangle plus a `"{label} {confidence}"` tag per
/// detection, in the order given.
///
/// The tag sits on a filled strip just above the box, or inside its top edge
/// when there is no room above. Inverted boxes are drawn between their
/// corners; boxes are clipped to the image and ones that fall entirely
/// outside are skipped.
pub fn draw_detections(img: &mut RgbImage, detections: &[Detection], color: Rgb<u8>, thickness: u32) {
    let (w, h) = (img.width() as f32, img.height() as f32);
    if w == 0.0 || h == 0.0 {
        return;
    }

    for det in detections {
        let (left, top, right, bottom) = det.corners();
        if !(left.is_finite() && top.is_finite() && right.is_finite() && bottom.is_finite()) {
            continue;
        }
        if right < 0.0 || bottom < 0.0 || left >= w || top >= h {
            continue;
        }

        let x0 = left.max(0.0).round() as i32;
        let y0 = top.max(0.0).round() as i32;
        let x1 = right.min(w - 1.0).round() as i32;
        let y1 = bottom.min(h - 1.0).round() as i32;

        draw_label(img, &format!("{} {:.2}", det.label, det.confidence), (x0, y0), color);

        for t in 0..thickness.max(1) as i32 {
            let (rw, rh) = (x1 - x0 - 2 * t + 1, y1 - y0 - 2 * t + 1);
            if rw <= 0 || rh <= 0 {
                break;
            }
            let rect = Rect::at(x0 + t, y0 + t).of_size(rw as u32, rh as u32);
            draw_hollow_rect_mut(img, rect, color);
        }
    }
}

fn draw_label(img: &mut RgbImage, text: &str, (x, y): (i32, i32), background: Rgb<u8>) {
    let width = GLYPH_WIDTH * text.chars().count() as u32 + 2;
    let top = if y >= LABEL_HEIGHT as i32 { y - LABEL_HEIGHT as i32 } else { y };
    draw_filled_rect_mut(img, Rect::at(x, top).of_size(width, LABEL_HEIGHT), background);

    let [r, g, b] = LABEL_TEXT_COLOR.0;
    let style = MonoTextStyle::new(&FONT_6X10, Rgb888::new(r, g, b));
    let mut target = ImageDrawTarget { image: img };
    let _ = Text::with_baseline(text, Point::new(x + 1, top + 1), style, Baseline::Top).draw(&mut target);
}

/// Lets embedded-graphics draw onto an `RgbImage`, clipping to its bounds.
struct ImageDrawTarget<'a> {
    image: &'a mut RgbImage,
}

impl OriginDimensions for ImageDrawTarget<'_> {
    fn size(&self) -> Size {
        Size::new(self.image.width(), self.image.height())
    }
}

impl DrawTarget for ImageDrawTarget<'_> {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = (self.image.width() as i32, self.image.height() as i32);
        for Pixel(coord, color) in pixels {
            if coord.x < 0 || coord.y < 0 || coord.x >= width || coord.y >= height {
                continue;
            }
            *self.image.get_pixel_mut(coord.x as u32, coord.y as u32) = Rgb([color.r(), color.g(), color.b()]);
        }
        Ok(())
    }
}

/// JPEG-encodes `img` at quality 80.
pub fn encode_jpeg(img: &RgbImage) -> Result<Vec<u8>> {
    let mut jpeg = Vec::new();
    let mut enc = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, 80);
    enc.encode(img.as_raw(), img.width(), img.height(), image::ExtendedColorType::Rgb8)?;
    Ok(jpeg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_box_outline_with_empty_interior() {
        let mut img = RgbImage::new(40, 40);
        let det = Detection::new("car", 5.0, 20.0, 10.0, 10.0, 0.9);
        draw_detections(&mut img, &[det], BOX_COLOR, 1);

        assert_eq!(img.get_pixel(5, 20), &BOX_COLOR);
        assert_eq!(img.get_pixel(15, 20), &BOX_COLOR);
        assert_eq!(img.get_pixel(5, 30), &BOX_COLOR);
        assert_eq!(img.get_pixel(15, 30), &BOX_COLOR);
        assert_eq!(img.get_pixel(10, 25), &Rgb([0, 0, 0]));
    }

    #[test]
    fn label_is_drawn_above_the_box() {
        let mut img = RgbImage::new(80, 80);
        let det = Detection::new("car", 20.0, 30.0, 40.0, 30.0, 0.9);
        draw_detections(&mut img, &[det], BOX_COLOR, 1);

        // strip above the top border, outside the rectangle itself
        assert_ne!(img.get_pixel(21, 20), &Rgb([0, 0, 0]));
        let text_pixels = (19..30u32)
            .flat_map(|y| (20..70u32).map(move |x| (x, y)))
            .filter(|&(x, y)| img.get_pixel(x, y) == &LABEL_TEXT_COLOR)
            .count();
        assert!(text_pixels > 0, "no label glyphs drawn");
        // nothing below the box
        assert_eq!(img.get_pixel(40, 70), &Rgb([0, 0, 0]));
    }

    #[test]
    fn label_moves_inside_when_box_touches_top() {
        let mut img = RgbImage::new(80, 80);
        let det = Detection::new("dog", 10.0, 2.0, 50.0, 40.0, 0.5);
        draw_detections(&mut img, &[det], BOX_COLOR, 1);

        assert_eq!(img.get_pixel(10, 2), &BOX_COLOR);
        let text_pixels = (2..14u32)
            .flat_map(|y| (10..60u32).map(move |x| (x, y)))
            .filter(|&(x, y)| img.get_pixel(x, y) == &LABEL_TEXT_COLOR)
            .count();
        assert!(text_pixels > 0, "no label glyphs drawn");
    }

    #[test]
    fn inverted_and_offscreen_boxes_do_not_panic() {
        let mut img = RgbImage::new(20, 20);
        let dets = vec![
            Detection::new("a", 15.0, 15.0, -10.0, -10.0, 0.9),
            Detection::new("b", -50.0, -50.0, 10.0, 10.0, 0.9),
            Detection::new("c", 10.0, 10.0, 500.0, 500.0, 0.9),
            Detection::new("d", f32::NAN, 0.0, 1.0, 1.0, 0.9),
        ];
        draw_detections(&mut img, &dets, BOX_COLOR, 3);
        assert_eq!(img.get_pixel(5, 5), &BOX_COLOR);
        assert_eq!(img.get_pixel(19, 19), &BOX_COLOR);
    }

    #[test]
    fn encodes_jpeg() {
        let img = RgbImage::new(8, 8);
        let jpeg = encode_jpeg(&img).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }
}
