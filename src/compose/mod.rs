//! Ad image composition
//!
//! An ad is a fixed [`CANVAS_WIDTH`]x[`CANVAS_HEIGHT`] canvas filled with the
//! detected background color, with the background-removed overlay drawn at
//! twice its size against the bottom edge and the phrase fitted across the
//! top.

pub mod text;

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use tracing::debug;

use crate::constants::{
    CANVAS_HEIGHT, CANVAS_WIDTH, FONT_SIZE_FLOOR, FONT_SIZE_START, OVERLAY_SCALE,
    TEXT_PADDING_TOP, TEXT_PADDING_X,
};
use crate::error::AdforgeError;
pub use text::{FontBook, GlyphRenderer, TextRenderer, TextRun};

const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// An opaque RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackgroundColor {
    /// red
    pub r: u8,
    /// green
    pub g: u8,
    /// blue
    pub b: u8,
}

impl BackgroundColor {
    /// Builds a color from its components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Fully opaque pixel of this color.
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Parses classifier output such as `(176, 6, 50)` or `rgb(176, 6, 50)`.
impl FromStr for BackgroundColor {
    type Err = AdforgeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = || AdforgeError::MalformedColor(raw.to_string());
        let inner = raw
            .trim()
            .trim_start_matches("rgb")
            .trim_start()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(malformed)?;

        let parts = inner
            .split(',')
            .map(|part| part.trim().parse::<u8>())
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|_| malformed())?;

        match parts.as_slice() {
            [r, g, b] => Ok(Self::new(*r, *g, *b)),
            _ => Err(malformed()),
        }
    }
}

/// A decoded image, owned by whoever is composing with it.
#[derive(Clone, Debug)]
pub struct RasterImage {
    pixels: RgbaImage,
}

impl RasterImage {
    /// Decodes PNG/JPEG bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, AdforgeError> {
        let pixels = image::load_from_memory(bytes)
            .map_err(AdforgeError::Decode)?
            .to_rgba8();
        Ok(Self { pixels })
    }

    /// Wraps already decoded pixels.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// width in pixels
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// height in pixels
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// The pixel buffer.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// A finished ad, PNG encoded.
#[derive(Clone, Debug)]
pub struct AdImage {
    png: Vec<u8>,
    font_size: u32,
}

impl AdImage {
    /// The encoded PNG.
    pub fn png(&self) -> &[u8] {
        &self.png
    }

    /// Font size the phrase ended up drawn at.
    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    /// Decodes the PNG back into pixels.
    pub fn decode(&self) -> Result<RgbaImage, AdforgeError> {
        Ok(image::load_from_memory_with_format(&self.png, ImageFormat::Png)
            .map_err(AdforgeError::Decode)?
            .to_rgba8())
    }
}

/// Where the scaled overlay lands on the canvas. Offsets may be negative
/// and the overlay may extend past the canvas; the excess is clipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// left edge
    pub x: i64,
    /// top edge
    pub y: i64,
    /// scaled width
    pub width: u32,
    /// scaled height
    pub height: u32,
}

/// Places an overlay of the given natural size: scaled by
/// [`OVERLAY_SCALE`], centered horizontally, bottom on the canvas bottom.
pub fn overlay_placement(width: u32, height: u32) -> Placement {
    let width = width.saturating_mul(OVERLAY_SCALE);
    let height = height.saturating_mul(OVERLAY_SCALE);
    Placement {
        x: (i64::from(CANVAS_WIDTH) - i64::from(width)).div_euclid(2),
        y: i64::from(CANVAS_HEIGHT) - i64::from(height),
        width,
        height,
    }
}

/// The source pixels along one axis that can reach the canvas once scaled
/// by [`OVERLAY_SCALE`] and placed at `offset`, as `(first, count)`. One
/// extra pixel is kept on each side for the resize filter.
fn visible_span(offset: i64, natural: u32, canvas: u32) -> Option<(u32, u32)> {
    let scale = i64::from(OVERLAY_SCALE);
    let natural = i64::from(natural);
    let scaled = natural * scale;
    let start = (-offset).clamp(0, scaled);
    let end = (i64::from(canvas) - offset).clamp(0, scaled);
    if start >= end {
        return None;
    }
    let first = (start / scale - 1).max(0);
    let last = ((end + scale - 1) / scale + 1).min(natural);
    Some((first as u32, (last - first) as u32))
}

/// Picks the largest size from [`FONT_SIZE_START`] down to
/// [`FONT_SIZE_FLOOR`] at which `text` fits in `max_width`. If nothing
/// fits the floor size is returned and the text overflows.
pub fn fit_font_size<R: TextRenderer + ?Sized>(
    renderer: &R,
    text: &str,
    family: &str,
    max_width: f32,
) -> Result<u32, AdforgeError> {
    let mut size = FONT_SIZE_START;
    let mut width = renderer.measure(&TextRun {
        text,
        family,
        size: size as f32,
    })?;
    while width > max_width && size > FONT_SIZE_FLOOR {
        size -= 1;
        width = renderer.measure(&TextRun {
            text,
            family,
            size: size as f32,
        })?;
    }
    debug!("Fitted {:?} at {}px ({:.1}px wide)", text, size, width);
    Ok(size)
}

/// Builds ads with a given text backend.
#[derive(Debug)]
pub struct AdComposer<R> {
    renderer: R,
}

impl<R: TextRenderer> AdComposer<R> {
    /// Composer drawing text with `renderer`.
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    /// Renders and encodes one ad.
    pub fn compose(
        &self,
        background: BackgroundColor,
        overlay: &RasterImage,
        phrase: &str,
        font_family: &str,
    ) -> Result<AdImage, AdforgeError> {
        let mut canvas = RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, background.to_rgba());

        let placement = overlay_placement(overlay.width(), overlay.height());
        // only the part that lands on the canvas gets scaled
        if let (Some((src_x, src_width)), Some((src_y, src_height))) = (
            visible_span(placement.x, overlay.width(), CANVAS_WIDTH),
            visible_span(placement.y, overlay.height(), CANVAS_HEIGHT),
        ) {
            let visible =
                imageops::crop_imm(overlay.pixels(), src_x, src_y, src_width, src_height)
                    .to_image();
            let scaled = imageops::resize(
                &visible,
                src_width * OVERLAY_SCALE,
                src_height * OVERLAY_SCALE,
                FilterType::Triangle,
            );
            imageops::overlay(
                &mut canvas,
                &scaled,
                placement.x + i64::from(src_x * OVERLAY_SCALE),
                placement.y + i64::from(src_y * OVERLAY_SCALE),
            );
        }

        let max_width = (CANVAS_WIDTH - TEXT_PADDING_X * 2) as f32;
        let font_size = fit_font_size(&self.renderer, phrase, font_family, max_width)?;
        let run = TextRun {
            text: phrase,
            family: font_family,
            size: font_size as f32,
        };
        let text_width = self.renderer.measure(&run)?;
        let left = CANVAS_WIDTH as f32 / 2.0 - text_width / 2.0;
        self.renderer.draw(
            &mut canvas,
            &run,
            left,
            TEXT_PADDING_TOP as f32,
            TEXT_COLOR,
        )?;

        let mut png = Vec::new();
        canvas
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(AdforgeError::Encode)?;
        Ok(AdImage { png, font_size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is half an em wide.
    struct HalfEm;

    impl TextRenderer for HalfEm {
        fn measure(&self, run: &TextRun<'_>) -> Result<f32, AdforgeError> {
            Ok(run.text.chars().count() as f32 * run.size * 0.5)
        }

        fn draw(
            &self,
            _canvas: &mut RgbaImage,
            _run: &TextRun<'_>,
            _left: f32,
            _top: f32,
            _color: Rgba<u8>,
        ) -> Result<(), AdforgeError> {
            Ok(())
        }
    }

    #[test]
    fn parses_classifier_colors() {
        assert_eq!(
            "(176, 6, 50)".parse::<BackgroundColor>().expect("parse"),
            BackgroundColor::new(176, 6, 50)
        );
        assert_eq!(
            " rgb(1,2,3)\n".parse::<BackgroundColor>().expect("parse"),
            BackgroundColor::new(1, 2, 3)
        );
        for bad in ["", "(1, 2)", "(1, 2, 3, 4)", "(256, 0, 0)", "1, 2, 3", "(a, b, c)"] {
            assert!(
                matches!(
                    bad.parse::<BackgroundColor>(),
                    Err(AdforgeError::MalformedColor(_))
                ),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn color_display_matches_classifier_format() {
        assert_eq!(BackgroundColor::new(9, 8, 7).to_string(), "(9, 8, 7)");
    }

    #[test]
    fn short_phrases_keep_the_starting_size() {
        assert_eq!(fit_font_size(&HalfEm, "Hi", "Arial", 293.0).expect("fit"), 20);
    }

    #[test]
    fn long_phrases_shrink_until_they_fit() {
        // 30 chars at 0.5em: fits once 15 * size <= 293, so size 19
        let phrase = "a".repeat(30);
        assert_eq!(fit_font_size(&HalfEm, &phrase, "Arial", 293.0).expect("fit"), 19);
        // 50 chars: 25 * size <= 293 needs size 11
        let phrase = "a".repeat(50);
        assert_eq!(fit_font_size(&HalfEm, &phrase, "Arial", 293.0).expect("fit"), 11);
    }

    #[test]
    fn very_long_phrases_stop_at_the_floor() {
        let phrase = "a".repeat(500);
        assert_eq!(
            fit_font_size(&HalfEm, &phrase, "Arial", 293.0).expect("fit"),
            FONT_SIZE_FLOOR
        );
    }

    #[test]
    fn fitted_size_is_bounded_and_fits_or_floors() {
        for len in 0..200 {
            let phrase = "x".repeat(len);
            let size = fit_font_size(&HalfEm, &phrase, "Arial", 293.0).expect("fit");
            assert!((FONT_SIZE_FLOOR..=FONT_SIZE_START).contains(&size));
            let width = HalfEm
                .measure(&TextRun {
                    text: &phrase,
                    family: "Arial",
                    size: size as f32,
                })
                .expect("measure");
            assert!(width <= 293.0 || size == FONT_SIZE_FLOOR);
        }
    }

    #[test]
    fn overlays_are_doubled_centered_and_bottom_anchored() {
        assert_eq!(
            overlay_placement(50, 40),
            Placement {
                x: 116,
                y: 512,
                width: 100,
                height: 80
            }
        );
        // larger than the canvas: negative offsets, not an error
        let big = overlay_placement(400, 400);
        assert_eq!((big.width, big.height), (800, 800));
        assert_eq!(big.x, (333 - 800_i64).div_euclid(2));
        assert_eq!(big.y, 592 - 800);
    }

    #[test]
    fn composed_ads_have_fixed_size_and_exact_background() {
        let composer = AdComposer::new(HalfEm);
        let overlay = RasterImage::from_rgba(RgbaImage::from_pixel(10, 10, Rgba([0, 255, 0, 255])));
        let ad = composer
            .compose(BackgroundColor::new(176, 6, 50), &overlay, "Hello", "Arial")
            .expect("compose");
        let pixels = ad.decode().expect("decode");
        assert_eq!(pixels.dimensions(), (CANVAS_WIDTH, CANVAS_HEIGHT));
        for (x, y) in [(0, 0), (CANVAS_WIDTH - 1, 0), (0, CANVAS_HEIGHT - 1)] {
            assert_eq!(*pixels.get_pixel(x, y), Rgba([176, 6, 50, 255]));
        }
        // the 20x20 overlay sits centered on the bottom edge
        assert_eq!(
            *pixels.get_pixel(CANVAS_WIDTH / 2, CANVAS_HEIGHT - 1),
            Rgba([0, 255, 0, 255])
        );
        assert_eq!(
            *pixels.get_pixel(CANVAS_WIDTH / 2, CANVAS_HEIGHT - 21),
            Rgba([176, 6, 50, 255])
        );
    }

    #[test]
    fn transparent_overlay_pixels_show_the_background() {
        let composer = AdComposer::new(HalfEm);
        let overlay = RasterImage::from_rgba(RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 0])));
        let ad = composer
            .compose(BackgroundColor::new(10, 20, 30), &overlay, "", "Arial")
            .expect("compose");
        let pixels = ad.decode().expect("decode");
        assert_eq!(
            *pixels.get_pixel(CANVAS_WIDTH / 2, CANVAS_HEIGHT - 1),
            Rgba([10, 20, 30, 255])
        );
    }

    #[test]
    fn oversized_overlays_are_clipped() {
        let composer = AdComposer::new(HalfEm);
        let overlay =
            RasterImage::from_rgba(RgbaImage::from_pixel(400, 400, Rgba([255, 255, 255, 255])));
        let ad = composer
            .compose(BackgroundColor::new(0, 0, 0), &overlay, "Big", "Arial")
            .expect("compose");
        let pixels = ad.decode().expect("decode");
        assert_eq!(pixels.dimensions(), (CANVAS_WIDTH, CANVAS_HEIGHT));
        assert_eq!(*pixels.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn only_the_visible_part_of_huge_overlays_is_scaled() {
        let placement = overlay_placement(4000, 8000);
        let (_, width) =
            visible_span(placement.x, 4000, CANVAS_WIDTH).expect("visible horizontally");
        let (_, height) =
            visible_span(placement.y, 8000, CANVAS_HEIGHT).expect("visible vertically");
        assert!(width * OVERLAY_SCALE <= CANVAS_WIDTH + 4 * OVERLAY_SCALE);
        assert!(height * OVERLAY_SCALE <= CANVAS_HEIGHT + 4 * OVERLAY_SCALE);

        // entirely off canvas, or empty
        assert_eq!(visible_span(400, 10, CANVAS_WIDTH), None);
        assert_eq!(visible_span(-20, 10, CANVAS_WIDTH), None);
        assert_eq!(visible_span(0, 0, CANVAS_WIDTH), None);
        // small overlays are kept whole
        assert_eq!(visible_span(116, 50, CANVAS_WIDTH), Some((0, 50)));
    }

    #[test]
    fn cropped_overlays_match_scaling_the_whole_image() {
        let overlay = RgbaImage::from_fn(400, 300, |x, y| {
            Rgba([(x % 251) as u8, (y % 241) as u8, ((x * 7 + y * 3) % 256) as u8, 255])
        });
        let background = BackgroundColor::new(3, 4, 5);

        let placement = overlay_placement(400, 300);
        let mut expected =
            RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, background.to_rgba());
        let full = imageops::resize(
            &overlay,
            placement.width,
            placement.height,
            FilterType::Triangle,
        );
        imageops::overlay(&mut expected, &full, placement.x, placement.y);

        let ad = AdComposer::new(HalfEm)
            .compose(background, &RasterImage::from_rgba(overlay), "", "Arial")
            .expect("compose");
        let pixels = ad.decode().expect("decode");
        for (got, want) in pixels.pixels().zip(expected.pixels()) {
            for channel in 0..4 {
                assert!(got[channel].abs_diff(want[channel]) <= 1, "{got:?} vs {want:?}");
            }
        }
    }

    #[test]
    fn ads_remember_the_fitted_font_size() {
        let composer = AdComposer::new(HalfEm);
        let overlay = RasterImage::from_rgba(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255])));
        let ad = composer
            .compose(BackgroundColor::new(0, 0, 0), &overlay, &"a".repeat(50), "Arial")
            .expect("compose");
        assert_eq!(ad.font_size(), 11);
        let ad = composer
            .compose(BackgroundColor::new(0, 0, 0), &overlay, "Hi", "Arial")
            .expect("compose");
        assert_eq!(ad.font_size(), FONT_SIZE_START);
    }

    #[test]
    fn undecodable_overlays_fail() {
        assert!(matches!(
            RasterImage::decode(b"definitely not an image"),
            Err(AdforgeError::Decode(_))
        ));
    }
}
