//! CLI parser
use clap::Parser;
use std::path::PathBuf;

use crate::constants::{DEFAULT_OUTPUT_DIR, DEFAULT_PHRASE_ENDPOINT, DEFAULT_WORK_DIR};

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "ADFORGE_DEBUG")]
    /// Enable debug logging. Env: ADFORGE_DEBUG
    pub debug: bool,

    #[clap(
        long,
        short,
        default_value = "adforge.sqlite",
        env = "ADFORGE_DATABASE_PATH"
    )]
    /// Path to the database file, eg `/data/adforge.sqlite`.
    /// Env: ADFORGE_DATABASE_PATH
    pub database_path: String,

    #[clap(long, short, default_value = DEFAULT_OUTPUT_DIR, env = "ADFORGE_OUTPUT_DIR")]
    /// Where finished ads are written, defaults to `./ads`.
    /// Env: ADFORGE_OUTPUT_DIR
    pub output_dir: PathBuf,

    #[clap(long, short, default_value = DEFAULT_WORK_DIR, env = "ADFORGE_WORK_DIR")]
    /// Scratch directory for downloaded source images, defaults to `./work`.
    /// Env: ADFORGE_WORK_DIR
    pub work_dir: PathBuf,

    #[clap(long, default_value = DEFAULT_PHRASE_ENDPOINT, env = "ADFORGE_PHRASE_ENDPOINT")]
    /// Phrase generation service.
    /// Env: ADFORGE_PHRASE_ENDPOINT
    pub phrase_endpoint: String,

    #[clap(long, env = "ADFORGE_FONT_DIR", value_delimiter = ',')]
    /// Directories searched for font files named after the predicted family.
    /// Env: ADFORGE_FONT_DIR (comma separated)
    pub font_dir: Vec<PathBuf>,

    #[clap(long, default_value = "python", env = "ADFORGE_PYTHON")]
    /// Interpreter used to run the classifier scripts.
    /// Env: ADFORGE_PYTHON
    pub python: String,

    #[clap(long, default_value = "backgroundColor.py")]
    /// Script printing the dominant background color as `(r, g, b)`
    pub background_script: PathBuf,

    #[clap(long, default_value = "font_style_predict.py")]
    /// Script printing the predicted font family
    pub font_script: PathBuf,

    #[clap(long, default_value = "font_classifier_model.h5")]
    /// Model file handed to the font script
    pub font_model: PathBuf,

    #[clap(
        long,
        help = "Detect the background color in-process instead of running the script"
    )]
    /// Use the built-in border color detector rather than `background_script`
    pub in_process_background: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        CliOptions::command().debug_assert();
    }

    #[test]
    fn directories_default_to_the_shared_constants() {
        let cli = CliOptions::try_parse_from(["adforge"]).expect("parse");
        assert_eq!(cli.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(cli.work_dir, PathBuf::from(DEFAULT_WORK_DIR));
        assert_eq!(cli.phrase_endpoint, DEFAULT_PHRASE_ENDPOINT);

        let cli = CliOptions::try_parse_from(["adforge", "-o", "/tmp/out", "--font-dir", "a,b"])
            .expect("parse");
        assert_eq!(cli.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(cli.font_dir, vec![PathBuf::from("a"), PathBuf::from("b")]);
    }
}
