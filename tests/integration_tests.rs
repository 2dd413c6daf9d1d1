//! Integration tests for the minusone pipeline
//!
//! Stems are generated as WAV fixtures; download and separation are replaced
//! by in-process fakes.

use minusone::config::{Settings, Source};
use minusone::error::{MinusOneError, Stage};
use minusone::export::read_manifest;
use minusone::mix::StemCombiner;
use minusone::paths::{
    mix_file_name, parse_mix_file_name, parse_variant_file_name, resolve_stem_directory,
    variant_file_name,
};
use minusone::pipeline;
use minusone::traits::{AudioDownloader, StemSeparator};
use minusone::types::{PitchSchedule, StemCount};
use minusone::{AudioBuffer, PitchVariantGenerator};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

const SAMPLE_RATE: u32 = 8000;

/// Generate a sine wave WAV file for testing
///
/// Creates a mono 16-bit WAV file at the specified path.
fn generate_sine_wav(path: &Path, frequency_hz: f32, duration_secs: f32, sample_rate: u32) {
    use std::f32::consts::PI;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV file");

    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let amplitude = 0.3f32; // Low enough that two stems never clip

    for i in 0..num_samples {
        let t = i as f32 / sample_rate as f32;
        let sample = (2.0 * PI * frequency_hz * t).sin() * amplitude;
        let sample_i16 = (sample * 32767.0) as i16;
        writer.write_sample(sample_i16).expect("Failed to write sample");
    }

    writer.finalize().expect("Failed to finalize WAV");
}

fn read_samples(path: &Path) -> (hound::WavSpec, Vec<i16>) {
    let mut reader = hound::WavReader::open(path).expect("Failed to open WAV");
    let spec = reader.spec();
    let samples = reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .expect("Failed to read samples");
    (spec, samples)
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Writes one sine stem per preset name into the resolved stem directory
struct FakeSeparator {
    calls: AtomicUsize,
    fail: bool,
}

impl FakeSeparator {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }
}

impl StemSeparator for FakeSeparator {
    fn separate(
        &self,
        input: &Path,
        output_base: &Path,
        stems: StemCount,
    ) -> minusone::Result<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MinusOneError::ToolFailed {
                tool: "fake",
                status: "exit status: 1".to_string(),
                stderr: "model not found".to_string(),
            });
        }
        let dir = resolve_stem_directory(output_base, &input.to_string_lossy())?;
        fs::create_dir_all(&dir)?;
        for (i, name) in stems.stem_names().iter().enumerate() {
            let freq = 220.0 * (i + 1) as f32;
            generate_sine_wav(&dir.join(format!("{}.wav", name)), freq, 0.5, SAMPLE_RATE);
        }
        Ok(dir)
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "fake-separator"
    }
}

/// "Downloads" by writing a fixture named after the video title
struct FakeDownloader;

impl AudioDownloader for FakeDownloader {
    fn download(&self, url: &str, dir: &Path) -> minusone::Result<PathBuf> {
        minusone::external::validate_url(url)?;
        fs::create_dir_all(dir)?;
        let path = dir.join("never_gonna_give_you_up.wav");
        generate_sine_wav(&path, 330.0, 0.5, SAMPLE_RATE);
        Ok(path)
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "fake-downloader"
    }
}

fn create_test_settings(source: Source, root: &Path) -> Settings {
    Settings {
        source,
        output_dir: root.join("audio_output"),
        download_dir: root.join("audio_from_yt"),
        stem_count: StemCount::Four,
        pitch_enabled: false,
        pitch_schedule: PitchSchedule::default(),
        force: false,
        show_progress: false,
        dry_run: false,
        write_manifest: true,
    }
}

// =============================================================================
// StemCombiner
// =============================================================================

#[test]
fn test_three_stems_give_pairwise_sums() {
    let dir = TempDir::new().unwrap();
    generate_sine_wav(&dir.path().join("bass.wav"), 110.0, 0.5, SAMPLE_RATE);
    generate_sine_wav(&dir.path().join("drums.wav"), 440.0, 0.5, SAMPLE_RATE);
    generate_sine_wav(&dir.path().join("vocals.wav"), 660.0, 0.5, SAMPLE_RATE);

    let mixes = StemCombiner::new().combine(dir.path()).unwrap();
    assert_eq!(mixes.len(), 3);

    let excluded: Vec<&str> = mixes.iter().map(|m| m.excluded.as_str()).collect();
    assert_eq!(excluded, vec!["bass", "drums", "vocals"]);

    let (_, bass) = read_samples(&dir.path().join("bass.wav"));
    let (_, drums) = read_samples(&dir.path().join("drums.wav"));
    let (_, vocals) = read_samples(&dir.path().join("vocals.wav"));

    let cases = [
        ("without_bass.wav", &drums, &vocals),
        ("without_drums.wav", &bass, &vocals),
        ("without_vocals.wav", &bass, &drums),
    ];
    for (name, a, b) in cases {
        let (spec, mixed) = read_samples(&dir.path().join(name));
        assert_eq!(spec.sample_rate, SAMPLE_RATE);
        assert_eq!(spec.channels, 1);
        assert_eq!(mixed.len(), a.len());
        for i in 0..mixed.len() {
            let expected = a[i] as i32 + b[i] as i32;
            assert!(
                (mixed[i] as i32 - expected).abs() <= 2,
                "{} sample {}: {} vs {}",
                name,
                i,
                mixed[i],
                expected
            );
        }
    }

    let without_bass = mixes.iter().find(|m| m.excluded == "bass").unwrap();
    assert_eq!(without_bass.included, vec!["drums", "vocals"]);
}

#[test]
fn test_two_stems_write_nothing() {
    let dir = TempDir::new().unwrap();
    generate_sine_wav(&dir.path().join("vocals.wav"), 440.0, 0.2, SAMPLE_RATE);
    generate_sine_wav(&dir.path().join("accompaniment.wav"), 220.0, 0.2, SAMPLE_RATE);
    let before = file_names(dir.path());

    let mixes = StemCombiner::new().combine(dir.path()).unwrap();

    assert!(mixes.is_empty());
    assert_eq!(file_names(dir.path()), before);
}

#[test]
fn test_combine_is_idempotent() {
    let dir = TempDir::new().unwrap();
    for (name, freq) in [("bass", 110.0), ("drums", 330.0), ("other", 550.0), ("vocals", 770.0)] {
        generate_sine_wav(&dir.path().join(format!("{}.wav", name)), freq, 0.3, SAMPLE_RATE);
    }

    let combiner = StemCombiner::new();
    let first = combiner.combine(dir.path()).unwrap();
    let first_bytes: Vec<Vec<u8>> = first.iter().map(|m| fs::read(&m.path).unwrap()).collect();

    let second = combiner.combine(dir.path()).unwrap();
    let second_bytes: Vec<Vec<u8>> = second.iter().map(|m| fs::read(&m.path).unwrap()).collect();

    assert_eq!(first, second);
    assert_eq!(first_bytes, second_bytes);
    // Four stems plus four mixes, no mixes of mixes
    assert_eq!(file_names(dir.path()).len(), 8);
}

#[test]
fn test_duplicate_stem_names_fail_before_writing() {
    let dir = TempDir::new().unwrap();
    generate_sine_wav(&dir.path().join("bass.wav"), 110.0, 0.2, SAMPLE_RATE);
    generate_sine_wav(&dir.path().join("drums.wav"), 330.0, 0.2, SAMPLE_RATE);
    generate_sine_wav(&dir.path().join("vocals.wav"), 440.0, 0.2, SAMPLE_RATE);
    fs::copy(dir.path().join("vocals.wav"), dir.path().join("vocals.flac")).unwrap();
    let before = file_names(dir.path());

    let err = StemCombiner::new().combine(dir.path()).unwrap_err();

    assert!(matches!(err, MinusOneError::DuplicateStem { ref name, .. } if name == "vocals"));
    assert_eq!(file_names(dir.path()), before);
}

#[test]
fn test_undecodable_stem_writes_nothing() {
    let dir = TempDir::new().unwrap();
    generate_sine_wav(&dir.path().join("bass.wav"), 110.0, 0.2, SAMPLE_RATE);
    generate_sine_wav(&dir.path().join("drums.wav"), 330.0, 0.2, SAMPLE_RATE);
    fs::write(dir.path().join("vocals.wav"), b"not audio").unwrap();

    let err = StemCombiner::new().combine(dir.path()).unwrap_err();

    assert!(matches!(err, MinusOneError::DecodeError { .. }));
    assert_eq!(
        file_names(dir.path()),
        vec!["bass.wav", "drums.wav", "vocals.wav"]
    );
}

#[test]
fn test_failed_mix_write_removes_earlier_mixes() {
    let dir = TempDir::new().unwrap();
    generate_sine_wav(&dir.path().join("bass.wav"), 110.0, 0.2, SAMPLE_RATE);
    generate_sine_wav(&dir.path().join("drums.wav"), 330.0, 0.2, SAMPLE_RATE);
    generate_sine_wav(&dir.path().join("vocals.wav"), 440.0, 0.2, SAMPLE_RATE);
    let stem_bytes = fs::read(dir.path().join("bass.wav")).unwrap();
    // The last mix cannot be created where a directory already sits
    fs::create_dir(dir.path().join("without_vocals.wav")).unwrap();

    let err = StemCombiner::new().combine(dir.path()).unwrap_err();

    assert!(matches!(err, MinusOneError::OutputError { .. }));
    assert!(!dir.path().join("without_bass.wav").exists());
    assert!(!dir.path().join("without_drums.wav").exists());
    assert!(dir.path().join("without_vocals.wav").is_dir());
    assert_eq!(
        file_names(dir.path()),
        vec!["bass.wav", "drums.wav", "vocals.wav", "without_vocals.wav"]
    );
    assert_eq!(fs::read(dir.path().join("bass.wav")).unwrap(), stem_bytes);
}

#[test]
fn test_mismatched_sample_rates_are_unsupported() {
    let dir = TempDir::new().unwrap();
    generate_sine_wav(&dir.path().join("bass.wav"), 110.0, 0.2, SAMPLE_RATE);
    generate_sine_wav(&dir.path().join("drums.wav"), 330.0, 0.2, SAMPLE_RATE * 2);
    generate_sine_wav(&dir.path().join("vocals.wav"), 440.0, 0.2, SAMPLE_RATE);

    let err = StemCombiner::new().combine(dir.path()).unwrap_err();

    assert!(matches!(
        err,
        MinusOneError::UnsupportedFormat { ref path, .. } if path.ends_with("drums.wav")
    ));
    assert_eq!(
        file_names(dir.path()),
        vec!["bass.wav", "drums.wav", "vocals.wav"]
    );
}

#[test]
fn test_mismatched_channel_counts_are_unsupported() {
    let dir = TempDir::new().unwrap();
    generate_sine_wav(&dir.path().join("bass.wav"), 110.0, 0.2, SAMPLE_RATE);
    generate_sine_wav(&dir.path().join("drums.wav"), 330.0, 0.2, SAMPLE_RATE);
    let stereo = AudioBuffer::new(vec![0.1; 2 * 1600], 2, SAMPLE_RATE);
    minusone::audio::write_wav(&dir.path().join("vocals.wav"), &stereo).unwrap();

    let err = StemCombiner::new().combine(dir.path()).unwrap_err();

    assert!(matches!(err, MinusOneError::UnsupportedFormat { .. }));
    assert!(!dir.path().join("without_bass.wav").exists());
}

// =============================================================================
// PitchVariantGenerator
// =============================================================================

#[test]
fn test_generate_default_schedule() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("without_vocals.wav");
    generate_sine_wav(&source, 440.0, 1.0, SAMPLE_RATE);
    let (_, original) = read_samples(&source);

    let variants = PitchVariantGenerator::default().generate(&source).unwrap();

    let offsets: Vec<i32> = variants.iter().map(|v| v.offset).collect();
    assert_eq!(offsets, vec![-5, -3, -1, 1, 3]);

    for variant in &variants {
        let expected = format!("without_vocals__{}.wav", variant.offset);
        assert_eq!(variant.path, dir.path().join(&expected));
        assert_eq!(variant.source, source);

        let (spec, samples) = read_samples(&variant.path);
        assert_eq!(spec.sample_rate, SAMPLE_RATE);
        assert_eq!(spec.channels, 1);
        assert_eq!(samples.len(), original.len());
    }
}

#[test]
fn test_generate_rejects_empty_source() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("silence.wav");
    generate_sine_wav(&source, 440.0, 0.0, SAMPLE_RATE);

    let err = PitchVariantGenerator::default().generate(&source).unwrap_err();

    assert!(matches!(
        err,
        MinusOneError::UnsupportedFormat { .. } | MinusOneError::DecodeError { .. }
    ));
    assert_eq!(file_names(dir.path()), vec!["silence.wav"]);
}

// =============================================================================
// Naming
// =============================================================================

#[test]
fn test_naming_round_trip() {
    for stem in ["bass", "drums", "vocals", "piano"] {
        let name = mix_file_name(stem, "wav");
        let parsed = parse_mix_file_name(&name).unwrap();
        assert_eq!(parsed.excluded, stem);
        assert_eq!(parsed.extension, "wav");
    }

    for offset in PitchSchedule::default().offsets() {
        let name = variant_file_name("without_vocals.wav", offset, "wav");
        let parsed = parse_variant_file_name(&name).unwrap();
        assert_eq!(parsed.base, "without_vocals");
        assert_eq!(parsed.offset, offset);
        assert_eq!(parsed.extension, "wav");
    }
}

// =============================================================================
// Pipeline
// =============================================================================

#[test]
fn test_pipeline_local_input_four_stems() {
    let root = TempDir::new().unwrap();
    let input = root.path().join("My Song.wav");
    generate_sine_wav(&input, 440.0, 0.5, SAMPLE_RATE);

    let mut settings = create_test_settings(Source::File(input.clone()), root.path());
    settings.pitch_enabled = true;
    let separator = FakeSeparator::new();

    let result = pipeline::run_with(&settings, &FakeDownloader, &separator).unwrap();

    let stem_dir = root.path().join("audio_output").join("My Song");
    assert_eq!(result.stem_directory, stem_dir);
    assert!(result.separated);
    assert_eq!(result.stems, vec!["bass", "drums", "other", "vocals"]);
    assert_eq!(result.mixes.len(), 4);
    assert_eq!(result.variants.len(), 5);
    assert!(result
        .variants
        .iter()
        .all(|v| v.source == stem_dir.join("without_vocals.wav")));

    let manifest = read_manifest(result.manifest.as_ref().unwrap()).unwrap();
    assert_eq!(manifest.source, "My Song");
    assert_eq!(manifest.stem_count, 4);
    assert_eq!(manifest.mixes.len(), 4);
    assert_eq!(manifest.variants.len(), 5);
    assert_eq!(manifest.pitch_source, Some(stem_dir.join("without_vocals.wav")));
}

#[test]
fn test_pipeline_reuses_existing_stems() {
    let root = TempDir::new().unwrap();
    let input = root.path().join("song.wav");
    generate_sine_wav(&input, 440.0, 0.3, SAMPLE_RATE);

    let mut settings = create_test_settings(Source::File(input), root.path());
    let separator = FakeSeparator::new();

    pipeline::run_with(&settings, &FakeDownloader, &separator).unwrap();
    let second = pipeline::run_with(&settings, &FakeDownloader, &separator).unwrap();
    assert!(!second.separated);
    assert_eq!(second.stems.len(), 4);
    assert_eq!(separator.calls.load(Ordering::SeqCst), 1);

    settings.force = true;
    let forced = pipeline::run_with(&settings, &FakeDownloader, &separator).unwrap();
    assert!(forced.separated);
    assert_eq!(separator.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_pipeline_changed_stem_count_separates_again() {
    let root = TempDir::new().unwrap();
    let input = root.path().join("song.wav");
    generate_sine_wav(&input, 440.0, 0.3, SAMPLE_RATE);
    let separator = FakeSeparator::new();

    let mut settings = create_test_settings(Source::File(input), root.path());
    settings.stem_count = StemCount::Two;
    settings.pitch_enabled = true;
    pipeline::run_with(&settings, &FakeDownloader, &separator).unwrap();

    settings.stem_count = StemCount::Four;
    let result = pipeline::run_with(&settings, &FakeDownloader, &separator).unwrap();

    assert!(result.separated);
    assert_eq!(separator.calls.load(Ordering::SeqCst), 2);
    assert_eq!(result.stems, vec!["bass", "drums", "other", "vocals"]);
    let without_vocals = result.mixes.iter().find(|m| m.excluded == "vocals").unwrap();
    assert_eq!(without_vocals.included, vec!["bass", "drums", "other"]);
    // Variants of the old accompaniment are gone with it
    assert!(!result.stem_directory.join("accompaniment__-5.wav").exists());
}

#[test]
fn test_pipeline_force_clears_previous_outputs() {
    let root = TempDir::new().unwrap();
    let input = root.path().join("song.wav");
    generate_sine_wav(&input, 440.0, 0.3, SAMPLE_RATE);
    let separator = FakeSeparator::new();

    let mut settings = create_test_settings(Source::File(input), root.path());
    let first = pipeline::run_with(&settings, &FakeDownloader, &separator).unwrap();
    fs::copy(
        first.stem_directory.join("vocals.wav"),
        first.stem_directory.join("accompaniment.wav"),
    )
    .unwrap();
    fs::write(first.stem_directory.join("notes.txt"), b"keep me").unwrap();

    settings.force = true;
    let forced = pipeline::run_with(&settings, &FakeDownloader, &separator).unwrap();

    assert!(forced.separated);
    assert_eq!(forced.stems, vec!["bass", "drums", "other", "vocals"]);
    assert!(forced.mixes.iter().all(|m| m.included.len() == 3));
    assert!(forced.stem_directory.join("notes.txt").exists());
}

#[test]
fn test_pipeline_from_url_two_stems() {
    let root = TempDir::new().unwrap();
    let mut settings = create_test_settings(
        Source::Url("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()),
        root.path(),
    );
    settings.stem_count = StemCount::Two;
    settings.pitch_enabled = true;

    let result = pipeline::run_with(&settings, &FakeDownloader, &FakeSeparator::new()).unwrap();

    assert_eq!(
        result.audio_file,
        root.path()
            .join("audio_from_yt")
            .join("never_gonna_give_you_up.wav")
    );
    assert!(result.mixes.is_empty());
    // Two stems: the accompaniment stem is the backing track
    let names: Vec<String> = result
        .variants
        .iter()
        .map(|v| v.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "accompaniment__-5.wav",
            "accompaniment__-3.wav",
            "accompaniment__-1.wav",
            "accompaniment__1.wav",
            "accompaniment__3.wav",
        ]
    );
}

#[test]
fn test_pipeline_invalid_url_fails_in_download_stage() {
    let root = TempDir::new().unwrap();
    let settings = create_test_settings(Source::Url("not a url".to_string()), root.path());
    let separator = FakeSeparator::new();

    let err = pipeline::run_with(&settings, &FakeDownloader, &separator).unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Download));
    assert!(matches!(err.root(), MinusOneError::InvalidUrl(_)));
    assert_eq!(separator.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_pipeline_separation_failure_stops_run() {
    let root = TempDir::new().unwrap();
    let input = root.path().join("song.wav");
    generate_sine_wav(&input, 440.0, 0.3, SAMPLE_RATE);
    let settings = create_test_settings(Source::File(input), root.path());

    let err = pipeline::run_with(&settings, &FakeDownloader, &FakeSeparator::failing())
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Separate));
    assert!(matches!(err.root(), MinusOneError::ToolFailed { .. }));
    assert!(!root.path().join("audio_output").join("song").exists());
}

#[test]
fn test_pipeline_dry_run_touches_nothing() {
    let root = TempDir::new().unwrap();
    let input = root.path().join("song.wav");
    generate_sine_wav(&input, 440.0, 0.3, SAMPLE_RATE);
    let mut settings = create_test_settings(Source::File(input), root.path());
    settings.dry_run = true;
    settings.pitch_enabled = true;
    let separator = FakeSeparator::new();

    let result = pipeline::run_with(&settings, &FakeDownloader, &separator).unwrap();

    assert_eq!(result.stems, vec!["bass", "drums", "other", "vocals"]);
    assert!(result.mixes.is_empty());
    assert_eq!(separator.calls.load(Ordering::SeqCst), 0);
    assert!(!root.path().join("audio_output").exists());
}

#[test]
fn test_pitch_command_on_directory_selects_backing_track() {
    let dir = TempDir::new().unwrap();
    generate_sine_wav(&dir.path().join("accompaniment.wav"), 220.0, 0.3, SAMPLE_RATE);
    generate_sine_wav(&dir.path().join("without_vocals.wav"), 330.0, 0.3, SAMPLE_RATE);

    let variants =
        pipeline::run_pitch(dir.path(), PitchSchedule::new(-1, 2, 2), false, false).unwrap();

    let offsets: Vec<i32> = variants.iter().map(|v| v.offset).collect();
    assert_eq!(offsets, vec![-1, 1]);
    assert!(variants
        .iter()
        .all(|v| v.source == dir.path().join("without_vocals.wav")));
}
