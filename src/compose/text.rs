//! Measuring and drawing the ad phrase

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use ab_glyph::{Font, FontArc, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use tracing::{debug, warn};

use crate::constants::FALLBACK_FONT_PATHS;
use crate::error::AdforgeError;

/// A phrase set in a particular font family and pixel size.
#[derive(Clone, Copy, Debug)]
pub struct TextRun<'a> {
    /// what to draw
    pub text: &'a str,
    /// font family, as predicted by the font classifier
    pub family: &'a str,
    /// em size in CSS pixels
    pub size: f32,
}

/// Font backend used by the composer.
///
/// `measure` and `draw` must agree: the width returned for a run covers
/// everything `draw` inks for the same run, give or take a pixel of
/// antialiasing.
pub trait TextRenderer {
    /// Advance width of the run in pixels.
    fn measure(&self, run: &TextRun<'_>) -> Result<f32, AdforgeError>;

    /// Draws the run with its left edge at `left` and the top of its line box at `top`.
    fn draw(
        &self,
        canvas: &mut RgbaImage,
        run: &TextRun<'_>,
        left: f32,
        top: f32,
        color: Rgba<u8>,
    ) -> Result<(), AdforgeError>;
}

impl<T: TextRenderer + ?Sized> TextRenderer for &T {
    fn measure(&self, run: &TextRun<'_>) -> Result<f32, AdforgeError> {
        (**self).measure(run)
    }

    fn draw(
        &self,
        canvas: &mut RgbaImage,
        run: &TextRun<'_>,
        left: f32,
        top: f32,
        color: Rgba<u8>,
    ) -> Result<(), AdforgeError> {
        (**self).draw(canvas, run, left, top, color)
    }
}

/// Lowercased alphanumerics only, so `Times New Roman`, `times_new_roman`
/// and `TimesNewRoman` all compare equal.
pub fn family_key(family: &str) -> String {
    family
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf"))
        .unwrap_or(false)
}

fn load_font(path: &Path) -> Option<FontArc> {
    let bytes = std::fs::read(path).ok()?;
    match FontArc::try_from_vec(bytes) {
        Ok(font) => Some(font),
        Err(err) => {
            warn!("Skipping unreadable font {}: {}", path.display(), err);
            None
        }
    }
}

/// Finds font files by family name.
///
/// Directories are searched for a `.ttf`/`.otf` whose file stem matches the
/// family (see [`family_key`]). Families that can't be found fall back to
/// the first loadable fallback font.
pub struct FontBook {
    dirs: Vec<PathBuf>,
    fallbacks: Vec<PathBuf>,
    loaded: Mutex<HashMap<String, FontArc>>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("dirs", &self.dirs)
            .field("fallbacks", &self.fallbacks)
            .finish_non_exhaustive()
    }
}

impl FontBook {
    /// Searches `dirs`, then the usual system fonts.
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self::with_fallbacks(
            dirs,
            FALLBACK_FONT_PATHS.iter().map(PathBuf::from).collect(),
        )
    }

    /// Searches `dirs`, then `fallbacks` in order.
    pub fn with_fallbacks(dirs: Vec<PathBuf>, fallbacks: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            fallbacks,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// The font for `family`, loading it on first use.
    pub fn resolve(&self, family: &str) -> Result<FontArc, AdforgeError> {
        let key = family_key(family);
        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(font) = loaded.get(&key) {
            return Ok(font.clone());
        }

        let font = match self.find_in_dirs(&key) {
            Some(font) => font,
            None => {
                let font = self
                    .fallbacks
                    .iter()
                    .find_map(|path| load_font(path))
                    .ok_or_else(|| AdforgeError::Font(family.to_string()))?;
                warn!("Font family {:?} not found, using fallback font", family);
                font
            }
        };
        loaded.insert(key, font.clone());
        Ok(font)
    }

    fn find_in_dirs(&self, key: &str) -> Option<FontArc> {
        for dir in &self.dirs {
            let Ok(entries) = std::fs::read_dir(dir) else {
                debug!("Font directory {} is unreadable", dir.display());
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if !is_font_file(&path) {
                    continue;
                }
                let matches = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .is_some_and(|stem| family_key(stem) == key);
                if matches && let Some(font) = load_font(&path) {
                    debug!("Using font {}", path.display());
                    return Some(font);
                }
            }
        }
        None
    }
}

/// Renders text with `ab_glyph` outlines through `imageproc`.
#[derive(Debug)]
pub struct GlyphRenderer {
    fonts: FontBook,
}

impl GlyphRenderer {
    /// Renderer drawing from the given font book.
    pub fn new(fonts: FontBook) -> Self {
        Self { fonts }
    }
}

/// Converts an em size in CSS pixels into an ab_glyph scale.
///
/// ab_glyph scales by line height (ascent - descent), not by the em square,
/// so the em size is stretched by the font's height-to-em ratio.
pub fn em_scale(font: &FontArc, size: f32) -> PxScale {
    match font.units_per_em() {
        Some(units_per_em) if units_per_em > 0.0 => {
            PxScale::from(size * font.height_unscaled() / units_per_em)
        }
        _ => PxScale::from(size),
    }
}

impl TextRenderer for GlyphRenderer {
    fn measure(&self, run: &TextRun<'_>) -> Result<f32, AdforgeError> {
        let font = self.fonts.resolve(run.family)?;
        // same glyph layout draw_text_mut uses
        let (width, _) = text_size(em_scale(&font, run.size), &font, run.text);
        Ok(width as f32)
    }

    fn draw(
        &self,
        canvas: &mut RgbaImage,
        run: &TextRun<'_>,
        left: f32,
        top: f32,
        color: Rgba<u8>,
    ) -> Result<(), AdforgeError> {
        let font = self.fonts.resolve(run.family)?;
        draw_text_mut(
            canvas,
            color,
            left.round() as i32,
            top.round() as i32,
            em_scale(&font, run.size),
            &font,
            run.text,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_keys_ignore_case_and_separators() {
        assert_eq!(family_key("Times New Roman"), "timesnewroman");
        assert_eq!(family_key("times_new-roman"), "timesnewroman");
        assert_eq!(family_key("LCD Mono"), "lcdmono");
    }

    #[test]
    fn missing_fonts_are_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let book = FontBook::with_fallbacks(
            vec![dir.path().to_path_buf()],
            vec![dir.path().join("nope.ttf")],
        );
        assert!(matches!(book.resolve("Arial"), Err(AdforgeError::Font(_))));
    }

    #[test]
    fn garbage_font_files_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("Arial.ttf"), b"not a font").expect("write");
        let book = FontBook::with_fallbacks(vec![dir.path().to_path_buf()], Vec::new());
        assert!(book.resolve("Arial").is_err());
    }
}
