//! Tables the scripts read and write

pub mod ad_sources;
pub mod extracted_images;
pub mod screenshots;
