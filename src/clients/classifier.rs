//! Background color and font style classification

use std::collections::HashMap;
use std::ffi::OsString;
use std::future::Future;
use std::path::Path;

use tokio::process::Command;
use tracing::debug;

use crate::compose::BackgroundColor;
use crate::error::AdforgeError;

/// Looks at an image on disk and names something about it.
pub trait Classifier {
    /// The classification as plain text, eg `(176, 6, 50)` or `Georgia`.
    fn classify(&self, image_path: &Path)
    -> impl Future<Output = Result<String, AdforgeError>> + Send;
}

/// Runs an external program and reads its answer from stdout.
///
/// The program is invoked as `program [leading..] <image_path> [trailing..]`.
#[derive(Clone, Debug)]
pub struct CommandClassifier {
    program: OsString,
    leading_args: Vec<OsString>,
    trailing_args: Vec<OsString>,
}

impl CommandClassifier {
    /// Runs `program` with no extra arguments.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            trailing_args: Vec::new(),
        }
    }

    /// Adds an argument before the image path.
    pub fn arg_before(mut self, arg: impl Into<OsString>) -> Self {
        self.leading_args.push(arg.into());
        self
    }

    /// Adds an argument after the image path.
    pub fn arg_after(mut self, arg: impl Into<OsString>) -> Self {
        self.trailing_args.push(arg.into());
        self
    }

    /// `python backgroundColor.py <image>`
    pub fn background_script(python: &str, script: &Path) -> Self {
        Self::new(python).arg_before(script)
    }

    /// `python font_style_predict.py <image> <model>`
    pub fn font_script(python: &str, script: &Path, model: &Path) -> Self {
        Self::new(python).arg_before(script).arg_after(model)
    }

    fn describe(&self) -> String {
        let mut parts = vec![self.program.to_string_lossy().to_string()];
        parts.extend(
            self.leading_args
                .iter()
                .map(|arg| arg.to_string_lossy().to_string()),
        );
        parts.join(" ")
    }
}

impl Classifier for CommandClassifier {
    async fn classify(&self, image_path: &Path) -> Result<String, AdforgeError> {
        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .arg(image_path)
            .args(&self.trailing_args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| {
                AdforgeError::Subprocess(format!("failed to run {}: {}", self.describe(), err))
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!("{} stderr: {}", self.describe(), stderr.trim());
        }
        if !output.status.success() {
            return Err(AdforgeError::Subprocess(format!(
                "{} exited with {}: {}",
                self.describe(),
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                AdforgeError::Subprocess(format!("{} printed nothing", self.describe()))
            })
    }
}

/// Finds the most common color along an image's border, in-process.
#[derive(Clone, Copy, Debug, Default)]
pub struct DominantColorClassifier;

impl DominantColorClassifier {
    /// The most frequent border color of `pixels`; ties go to the smallest
    /// RGB value so the answer is stable.
    pub fn border_color(pixels: &image::RgbImage) -> Option<BackgroundColor> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return None;
        }

        let mut counts: HashMap<[u8; 3], usize> = HashMap::new();
        let mut count = |x: u32, y: u32| {
            *counts.entry(pixels.get_pixel(x, y).0).or_default() += 1;
        };
        for x in 0..width {
            count(x, 0);
            if height > 1 {
                count(x, height - 1);
            }
        }
        for y in 1..height.saturating_sub(1) {
            count(0, y);
            if width > 1 {
                count(width - 1, y);
            }
        }

        counts
            .into_iter()
            .max_by(|(a_color, a_count), (b_color, b_count)| {
                a_count.cmp(b_count).then(b_color.cmp(a_color))
            })
            .map(|([r, g, b], _)| BackgroundColor::new(r, g, b))
    }
}

impl Classifier for DominantColorClassifier {
    async fn classify(&self, image_path: &Path) -> Result<String, AdforgeError> {
        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|err| AdforgeError::io_at(image_path, err))?;
        let pixels = image::load_from_memory(&bytes)
            .map_err(AdforgeError::Decode)?
            .to_rgb8();
        Self::border_color(&pixels)
            .map(|color| color.to_string())
            .ok_or_else(|| AdforgeError::Subprocess(format!("{} is empty", image_path.display())))
    }
}

/// Background detection picked at startup.
#[derive(Clone, Debug)]
pub enum BackgroundDetector {
    /// An external script
    Command(CommandClassifier),
    /// [`DominantColorClassifier`]
    InProcess(DominantColorClassifier),
}

impl Classifier for BackgroundDetector {
    async fn classify(&self, image_path: &Path) -> Result<String, AdforgeError> {
        match self {
            Self::Command(classifier) => classifier.classify(image_path).await,
            Self::InProcess(classifier) => classifier.classify(image_path).await,
        }
    }
}
