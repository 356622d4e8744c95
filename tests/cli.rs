use std::fs;
use std::path::Path;

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const SUBTITLES: &str = r#"{
    "sentences": [
        {"start": 0.0, "end": 1.5, "text": "Once upon a time."},
        {"start": 2.0, "end": 3.0, "text": "The end."}
    ],
    "words": [
        {"start": 0.0, "end": 0.4, "word": "Once"},
        {"start": 0.4, "end": 0.7, "word": "upon"},
        {"start": 0.7, "end": 0.9, "word": "a"},
        {"start": 0.9, "end": 1.5, "word": "time."},
        {"start": 2.0, "end": 2.4, "word": "The"},
        {"start": 2.4, "end": 3.0, "word": "end."}
    ]
}"#;

fn project() -> Result<TempDir> {
    let dir = tempfile::tempdir()?;
    fs::create_dir_all(dir.path().join("subtitles"))?;
    fs::create_dir_all(dir.path().join("images"))?;
    fs::write(dir.path().join("subtitles/subtitles.json"), SUBTITLES)?;
    for i in 0..2 {
        image::RgbImage::new(8, 16).save(dir.path().join(format!("images/image_{}.png", i)))?;
    }
    Ok(dir)
}

fn write_wav(path: &Path, sample_rate: u32, frames: usize) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for _ in 0..frames {
        writer.write_sample(0i16)?;
    }
    writer.finalize()?;
    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

#[test]
fn writes_plan_for_explicit_duration() -> Result<()> {
    let dir = project()?;
    Command::cargo_bin("reelplan")?
        .arg(dir.path())
        .args(["--audio-duration", "4.0", "--effect", "pan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan complete"));

    let plan = read_json(&dir.path().join("plan.json"))?;
    assert_eq!(plan["total_duration"].as_f64(), Some(4.0));
    let timeline = plan["timeline"].as_array().unwrap();
    assert_eq!(timeline.len(), 4);
    assert_eq!(timeline[0]["effect"]["kind"], "pan");
    assert_eq!(timeline[1]["gap_fill"], true);
    assert_eq!(timeline[2]["effect"]["kind"], "pan");
    assert_eq!(timeline[3]["gap_fill"], true);
    assert_eq!(timeline.last().unwrap()["end"].as_f64(), Some(4.0));

    let captions = plan["captions"].as_array().unwrap();
    assert_eq!(captions[0]["text"], "Once upon a");
    assert_eq!(captions[1]["text"], "time.");
    Ok(())
}

#[test]
fn probes_project_audio_and_writes_extras() -> Result<()> {
    let dir = project()?;
    write_wav(&dir.path().join("full_audio.wav"), 8_000, 20_000)?;
    let out = dir.path().join("out");

    Command::cargo_bin("reelplan")?
        .arg(dir.path())
        .arg("--output")
        .arg(out.join("plan.json"))
        .arg("--subtitles-srt")
        .arg(out.join("captions.srt"))
        .arg("--frames")
        .arg(out.join("frames.json"))
        .args(["--fps", "10", "--effect-policy", "round-robin"])
        .assert()
        .success();

    let plan = read_json(&out.join("plan.json"))?;
    assert_eq!(plan["total_duration"].as_f64(), Some(2.5));
    // second speech segment is cut at the audio end
    let last = plan["timeline"].as_array().unwrap().last().cloned().unwrap();
    assert_eq!(last["start"].as_f64(), Some(2.0));
    assert_eq!(last["end"].as_f64(), Some(2.5));

    let srt = fs::read_to_string(out.join("captions.srt"))?;
    assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:00,900\nOnce upon a\n"));
    assert!(srt.contains("00:00:02,000 --> 00:00:02,500\nThe end.\n"));

    let frames = read_json(&out.join("frames.json"))?;
    assert_eq!(frames.as_array().unwrap().len(), 25);
    Ok(())
}

#[test]
fn same_seed_gives_identical_plans() -> Result<()> {
    let dir = project()?;
    let mut outputs = Vec::new();
    for name in ["a.json", "b.json"] {
        let output = dir.path().join(name);
        Command::cargo_bin("reelplan")?
            .arg(dir.path())
            .args(["--audio-duration", "00:00:05,000", "--seed", "7", "-o"])
            .arg(&output)
            .assert()
            .success();
        outputs.push(fs::read_to_string(output)?);
    }
    assert_eq!(outputs[0], outputs[1]);
    Ok(())
}

#[test]
fn missing_images_fail() -> Result<()> {
    let dir = project()?;
    fs::remove_dir_all(dir.path().join("images"))?;
    fs::create_dir_all(dir.path().join("images"))?;

    Command::cargo_bin("reelplan")?
        .arg(dir.path())
        .args(["--audio-duration", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no images"));
    Ok(())
}

#[test]
fn rejects_unknown_effect() -> Result<()> {
    let dir = project()?;
    Command::cargo_bin("reelplan")?
        .arg(dir.path())
        .args(["--audio-duration", "3", "--effect", "spin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown effect"));
    Ok(())
}

#[test]
fn missing_project_dir_fails() -> Result<()> {
    Command::cargo_bin("reelplan")?
        .arg("/no/such/project")
        .args(["--audio-duration", "3"])
        .assert()
        .failure();
    Ok(())
}
