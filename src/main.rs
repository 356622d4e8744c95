use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use reelplan::assets::discover_images;
use reelplan::audio::probe_duration;
use reelplan::config::{AppConfig, ProjectLayout};
use reelplan::effects::PolicyConfig;
use reelplan::render::frame_schedule;
use reelplan::subtitles::{read_srt, write_srt};
use reelplan::{synthesize, EffectKind, Millis, SynthesisInput, Timestamp, Transcript};

/// reelplan - plan a narrated image reel
///
/// Reads a project's speech timestamps, images and narration audio and
/// writes the composition plan (visual timeline, motion effects, captions)
/// a renderer paints from.
#[derive(Parser, Debug)]
#[command(name = "reelplan")]
#[command(version)]
#[command(about = "Timeline and caption planner for image reels", long_about = None)]
struct Args {
    /// Project directory holding subtitles/subtitles.json, images/ and full_audio.*
    #[arg(value_name = "PROJECT_DIR")]
    project_dir: PathBuf,

    /// Where to write the plan JSON (default: <PROJECT_DIR>/plan.json)
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,

    /// JSON settings file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Narration audio file (default: <PROJECT_DIR>/full_audio.*)
    #[arg(long, value_name = "PATH", conflicts_with = "audio_duration")]
    audio: Option<PathBuf>,

    /// Audio duration instead of probing a file (seconds or HH:MM:SS,mmm)
    #[arg(long, value_name = "TIME")]
    audio_duration: Option<String>,

    /// Read speech segments from an SRT file instead of the ASR JSON
    #[arg(long, value_name = "PATH")]
    transcript_srt: Option<PathBuf>,

    /// Also write the caption chunks as SRT
    #[arg(long, value_name = "PATH")]
    subtitles_srt: Option<PathBuf>,

    /// Also write the per-frame schedule as JSON
    #[arg(long, value_name = "PATH")]
    frames: Option<PathBuf>,

    /// Frame rate for the frame schedule
    #[arg(long)]
    fps: Option<u32>,

    /// Maximum words per caption chunk
    #[arg(long)]
    max_words: Option<usize>,

    /// Characters per caption display line (0 disables wrapping)
    #[arg(long)]
    wrap_width: Option<usize>,

    /// How motion effects are chosen per segment
    #[arg(long, value_enum)]
    effect_policy: Option<PolicyArg>,

    /// Effect for the fixed policy (ken-burns, pan, zoom-out, static)
    #[arg(long, value_name = "KIND")]
    effect: Option<String>,

    /// Seed for the random policy
    #[arg(long)]
    seed: Option<u64>,

    /// Zoom headroom for motion effects (0.1 = up to 110%)
    #[arg(long)]
    zoom_delta: Option<f64>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum PolicyArg {
    Random,
    RoundRobin,
    Fixed,
}

impl Args {
    /// Validate CLI arguments
    fn validate(&self) -> Result<()> {
        if !self.project_dir.is_dir() {
            bail!("Project directory does not exist: {:?}", self.project_dir);
        }
        if let Some(audio) = &self.audio {
            ensure!(audio.is_file(), "Audio file does not exist: {:?}", audio);
        }
        if let Some(srt) = &self.transcript_srt {
            ensure!(srt.is_file(), "Transcript SRT does not exist: {:?}", srt);
        }
        if self.effect_policy == Some(PolicyArg::Fixed) && self.effect.is_none() {
            bail!("--effect-policy fixed needs --effect");
        }
        self.effect_kind()?;
        Ok(())
    }

    fn effect_kind(&self) -> Result<Option<EffectKind>> {
        match self.effect.as_deref() {
            Some(raw) => match EffectKind::parse(raw) {
                Some(kind) => Ok(Some(kind)),
                None => bail!(
                    "Unknown effect '{}' (expected ken-burns, pan, zoom-out or static)",
                    raw
                ),
            },
            None => Ok(None),
        }
    }

    /// Settings file overlaid with any CLI flags.
    fn app_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        if let Some(max_words) = self.max_words {
            config.captions.max_words = max_words;
        }
        if let Some(wrap_width) = self.wrap_width {
            config.captions.wrap_width = wrap_width;
        }
        if let Some(zoom_delta) = self.zoom_delta {
            config.zoom_delta = zoom_delta;
        }
        config.policy = self.policy(config.policy)?;
        config.validate().context("Invalid settings")?;
        Ok(config)
    }

    fn policy(&self, configured: PolicyConfig) -> Result<PolicyConfig> {
        let configured_seed = match configured {
            PolicyConfig::Random { seed } => seed,
            _ => 0,
        };
        let effect = self.effect_kind()?;
        let policy = match (self.effect_policy, effect) {
            (Some(PolicyArg::Random), _) => PolicyConfig::Random {
                seed: self.seed.unwrap_or(configured_seed),
            },
            (Some(PolicyArg::RoundRobin), _) => PolicyConfig::RoundRobin,
            (Some(PolicyArg::Fixed), Some(effect)) | (None, Some(effect)) => {
                PolicyConfig::Fixed { effect }
            }
            (Some(PolicyArg::Fixed), None) => bail!("--effect-policy fixed needs --effect"),
            (None, None) => match self.seed {
                Some(seed) => PolicyConfig::Random { seed },
                None => configured,
            },
        };
        Ok(policy)
    }

    fn audio_duration(&self, layout: &ProjectLayout) -> Result<Millis> {
        if let Some(raw) = self.audio_duration.as_deref() {
            return parse_time(raw).with_context(|| format!("Invalid audio duration '{}'", raw));
        }
        let path = match &self.audio {
            Some(path) => path.clone(),
            None => layout.find_audio()?,
        };
        println!("   Probing {:?}", path);
        probe_duration(&path).context("Failed to read audio duration")
    }

    fn transcript(&self, layout: &ProjectLayout) -> Result<Transcript> {
        if let Some(path) = &self.transcript_srt {
            return Ok(Transcript {
                segments: read_srt(path)?,
            });
        }
        let asr = layout.load_asr()?;
        Transcript::from_asr(&asr).context("Invalid ASR timestamps")
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    args.validate()
        .context("Failed to validate command-line arguments")?;
    let layout = ProjectLayout::from_dir(&args.project_dir)?;
    let config = args.app_config()?;

    println!("reelplan v{}", env!("CARGO_PKG_VERSION"));
    println!("Project: {:?}", layout.root);

    println!("\n1. Loading transcript...");
    let transcript = args.transcript(&layout)?;
    println!(
        "   {} speech segments, {} timed words",
        transcript.segments.len(),
        transcript.words().count()
    );

    println!("\n2. Discovering images...");
    let images = discover_images(&layout.images_dir)?;
    println!("   Found {} images", images.len());

    println!("\n3. Reading audio duration...");
    let audio_duration = args.audio_duration(&layout)?;
    println!("   Audio runs {}", audio_duration);

    println!("\n4. Synthesizing composition plan...");
    let input = SynthesisInput::new(images, transcript, audio_duration);
    let mut policy = config.policy.build();
    let plan = synthesize(&input, &config.synthesis(), &mut policy)
        .context("Failed to synthesize composition plan")?;
    println!(
        "   {} visual segments, {} caption chunks over {}",
        plan.timeline.len(),
        plan.captions.len(),
        plan.total_duration
    );

    println!("\n5. Writing outputs...");
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| layout.default_output());
    write_json(&output, &plan.to_json()?)?;
    println!("   Plan written to {:?}", output);

    if let Some(path) = &args.subtitles_srt {
        write_srt(path, &plan.captions)?;
        println!("   Captions written to {:?}", path);
    }
    if let Some(path) = &args.frames {
        let frames = frame_schedule(&plan, config.fps);
        write_json(path, &serde_json::to_string(&frames)?)?;
        println!(
            "   {} frames at {} fps written to {:?}",
            frames.len(),
            config.fps,
            path
        );
    }

    println!("\n✓ Plan complete!");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn write_json(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }
    fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))
}

/// Seconds (`12.5`) or a structured timestamp (`00:00:12,500`).
fn parse_time(raw: &str) -> Result<Millis> {
    if raw.contains(':') {
        let stamp: Timestamp = raw.parse()?;
        return Ok(stamp.into());
    }
    let seconds: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("Failed to parse seconds value '{}'", raw))?;
    Ok(Millis::from_secs_f64(seconds)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            project_dir: PathBuf::from("project"),
            output: None,
            config: None,
            audio: None,
            audio_duration: None,
            transcript_srt: None,
            subtitles_srt: None,
            frames: None,
            fps: None,
            max_words: None,
            wrap_width: None,
            effect_policy: None,
            effect: None,
            seed: None,
            zoom_delta: None,
        }
    }

    #[test]
    fn parse_time_seconds_and_timestamp() {
        assert_eq!(parse_time("12.5").unwrap(), Millis::from_millis(12_500));
        assert_eq!(parse_time("00:01:02,250").unwrap(), Millis::from_millis(62_250));
        assert!(parse_time("-3").is_err());
        assert!(parse_time("00:99:00,000").is_err());
    }

    #[test]
    fn effect_flag_implies_fixed_policy() {
        let args = Args {
            effect: Some("pan".to_string()),
            ..base_args()
        };
        assert_eq!(
            args.policy(PolicyConfig::default()).unwrap(),
            PolicyConfig::Fixed {
                effect: EffectKind::Pan
            }
        );
    }

    #[test]
    fn seed_flag_overrides_configured_seed() {
        let args = Args {
            seed: Some(11),
            ..base_args()
        };
        assert_eq!(
            args.policy(PolicyConfig::RoundRobin).unwrap(),
            PolicyConfig::Random { seed: 11 }
        );
        assert_eq!(
            base_args()
                .policy(PolicyConfig::RoundRobin)
                .unwrap(),
            PolicyConfig::RoundRobin
        );
    }

    #[test]
    fn fixed_policy_without_effect_is_rejected() {
        let args = Args {
            effect_policy: Some(PolicyArg::Fixed),
            ..base_args()
        };
        assert!(args.policy(PolicyConfig::default()).is_err());
    }

    #[test]
    fn cli_overrides_settings() {
        let args = Args {
            max_words: Some(5),
            fps: Some(24),
            effect_policy: Some(PolicyArg::RoundRobin),
            ..base_args()
        };
        let config = args.app_config().unwrap();
        assert_eq!(config.captions.max_words, 5);
        assert_eq!(config.fps, 24);
        assert_eq!(config.policy, PolicyConfig::RoundRobin);
    }
}
