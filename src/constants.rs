//! Shared constants/setters for things
//!

/// Width of the ad canvas in pixels
pub const CANVAS_WIDTH: u32 = 333;

/// Height of the ad canvas in pixels
pub const CANVAS_HEIGHT: u32 = 592;

/// Overlay images are drawn at this multiple of their natural size
pub const OVERLAY_SCALE: u32 = 2;

/// Font size the fitting loop starts from
pub const FONT_SIZE_START: u32 = 20;

/// Smallest font size the fitting loop will shrink to
pub const FONT_SIZE_FLOOR: u32 = 10;

/// Horizontal padding on each side of the phrase
pub const TEXT_PADDING_X: u32 = 20;

/// Distance from the canvas top to the top of the phrase
pub const TEXT_PADDING_TOP: u32 = 20;

/// Phrase used whenever the generation service can't give us one
pub const DEFAULT_PHRASE: &str = "Default USP phrase";

/// Where the phrase service listens by default
pub const DEFAULT_PHRASE_ENDPOINT: &str = "http://localhost:8000/generate-phrases";

/// remove.bg API endpoint
pub const REMOVE_BG_ENDPOINT: &str = "https://api.remove.bg/v1.0/removebg";

/// Selector for screenshot images on a Play Store listing
pub const SCREENSHOT_SELECTOR: &str = r#"img[alt="Screenshot image"]"#;

/// URL scheme for images held in the `extracted_images` table
pub const STORED_SCHEME: &str = "stored";

/// The default place we write finished ads
pub const DEFAULT_OUTPUT_DIR: &str = "./ads";

/// The default place downloaded source images land for the classifiers
pub const DEFAULT_WORK_DIR: &str = "./work";

/// Fonts tried when a family can't be found in the font directories
pub const FALLBACK_FONT_PATHS: &[&str] = &[
    // Linux
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSerif.ttf",
    // macOS
    "/System/Library/Fonts/Supplemental/Times New Roman.ttf",
    "/Library/Fonts/Arial.ttf",
    // Windows
    "C:\\Windows\\Fonts\\times.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];
