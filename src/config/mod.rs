use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::effects::{PolicyConfig, DEFAULT_ZOOM_DELTA};
use crate::plan::SynthesisConfig;
use crate::render::DEFAULT_FPS;
use crate::timeline::TimelineConfig;
use crate::types::{AsrData, CaptionConfig};

const AUDIO_STEM: &str = "full_audio";
const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "wav", "flac", "m4a", "ogg"];

/// Where a reel project keeps its inputs.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub subtitles_json: PathBuf,
    pub images_dir: PathBuf,
}

impl ProjectLayout {
    pub fn from_dir(path: &Path) -> Result<Self> {
        let root = canonicalize_dir(path)?;
        Ok(Self {
            subtitles_json: root.join("subtitles").join("subtitles.json"),
            images_dir: root.join("images"),
            root,
        })
    }

    /// `full_audio.<ext>` in the project root, trying the usual extensions.
    pub fn find_audio(&self) -> Result<PathBuf> {
        AUDIO_EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{}.{}", AUDIO_STEM, ext)))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| anyhow!("no {}.* audio file in {:?}", AUDIO_STEM, self.root))
    }

    pub fn default_output(&self) -> PathBuf {
        self.root.join("plan.json")
    }

    pub fn load_asr(&self) -> Result<AsrData> {
        load_asr(&self.subtitles_json)
    }
}

pub fn load_asr(path: &Path) -> Result<AsrData> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read ASR data from {:?}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse ASR data in {:?}", path))
}

/// Synthesis settings, read from an optional JSON file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub captions: CaptionConfig,
    pub zoom_delta: f64,
    pub policy: PolicyConfig,
    pub fps: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            captions: CaptionConfig::default(),
            zoom_delta: DEFAULT_ZOOM_DELTA,
            policy: PolicyConfig::default(),
            fps: DEFAULT_FPS,
        }
    }
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.captions.max_words > 0,
            "captions.max_words must be greater than zero"
        );
        ensure!(
            self.zoom_delta.is_finite() && self.zoom_delta > 0.0,
            "zoom_delta must be a positive number, got {}",
            self.zoom_delta
        );
        ensure!(self.fps > 0, "fps must be greater than zero");
        Ok(())
    }

    pub fn synthesis(&self) -> SynthesisConfig {
        SynthesisConfig {
            captions: self.captions,
            timeline: TimelineConfig {
                zoom_delta: self.zoom_delta,
            },
        }
    }
}

fn canonicalize_dir(path: &Path) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("failed to resolve project directory at {:?}", path))?;
    if canonical.is_dir() {
        Ok(canonical)
    } else {
        Err(anyhow!("project path {:?} is not a directory", canonical))
    }
}
