//! Pipeline orchestration
//!
//! Runs download, separation, combine and pitch in order. Each stage's error
//! is tagged with the stage name and stops the run.

use crate::audio::OUTPUT_EXTENSION;
use crate::config::{Settings, Source};
use crate::discovery;
use crate::error::{MinusOneError, Result, Stage, StageContext};
use crate::export::{self, RunRecord};
use crate::external::{SpleeterSeparator, YtDlpDownloader};
use crate::mix::{StemCombiner, MIN_STEMS_TO_COMBINE};
use crate::paths::{
    self, mix_file_name, resolve_stem_directory, select_pitch_target, variant_file_name,
    MANIFEST_FILE_NAME,
};
use crate::pitch::PitchVariantGenerator;
use crate::traits::{AudioDownloader, StemSeparator};
use crate::types::{Mix, PitchSchedule, PitchVariant, StemCount};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Pipeline result summary
#[derive(Debug, Default)]
pub struct PipelineResult {
    /// Audio file that was separated
    pub audio_file: PathBuf,
    pub stem_directory: PathBuf,
    /// Stem names found after separation
    pub stems: Vec<String>,
    /// False when existing stems were reused
    pub separated: bool,
    pub mixes: Vec<Mix>,
    pub variants: Vec<PitchVariant>,
    pub manifest: Option<PathBuf>,
}

/// Run the full pipeline with yt-dlp and spleeter
pub fn run(settings: &Settings) -> Result<PipelineResult> {
    run_with(settings, &YtDlpDownloader::new(), &SpleeterSeparator::new())
}

/// Run the full pipeline with the given collaborators
pub fn run_with(
    settings: &Settings,
    downloader: &dyn AudioDownloader,
    separator: &dyn StemSeparator,
) -> Result<PipelineResult> {
    let pipeline_start = Instant::now();

    if settings.dry_run {
        return run_dry_run(settings, downloader, separator);
    }

    // Stage 1: Download
    let stage_start = Instant::now();
    let audio_file = acquire_source(settings, downloader).in_stage(Stage::Download)?;
    info!(
        "Source ready: {} ({:.2}s)",
        audio_file.display(),
        stage_start.elapsed().as_secs_f64()
    );

    // Stage 2: Separate
    let stage_start = Instant::now();
    let (stem_directory, separated) =
        separate(settings, separator, &audio_file).in_stage(Stage::Separate)?;
    let stems: Vec<String> = discovery::scan_stems(&stem_directory)
        .in_stage(Stage::Separate)?
        .names()
        .into_iter()
        .map(str::to_string)
        .collect();
    info!(
        "{} stems in {} ({:.2}s)",
        stems.len(),
        stem_directory.display(),
        stage_start.elapsed().as_secs_f64()
    );

    // Stage 3: Combine
    let stage_start = Instant::now();
    let mixes = StemCombiner::new()
        .with_progress(settings.show_progress)
        .combine(&stem_directory)
        .in_stage(Stage::Combine)?;
    info!(
        "Wrote {} mixes in {:.2}s",
        mixes.len(),
        stage_start.elapsed().as_secs_f64()
    );

    // Stage 4: Pitch
    let variants = if settings.pitch_enabled {
        let stage_start = Instant::now();
        let variants = pitch_stem_directory(
            &stem_directory,
            settings.pitch_schedule,
            settings.show_progress,
        )
        .in_stage(Stage::Pitch)?;
        info!(
            "Wrote {} pitch variants in {:.2}s",
            variants.len(),
            stage_start.elapsed().as_secs_f64()
        );
        variants
    } else {
        Vec::new()
    };

    // Stage 5: Manifest
    let manifest = if settings.write_manifest {
        let path = stem_directory.join(MANIFEST_FILE_NAME);
        let source = source_label(&settings.source);
        let record = RunRecord {
            source: &source,
            audio_file: &audio_file,
            stem_directory: &stem_directory,
            stem_count: settings.stem_count,
            stems: &stems,
            mixes: &mixes,
            variants: &variants,
        };
        export::write_manifest(&record, &path).in_stage(Stage::Export)?;
        Some(path)
    } else {
        None
    };

    info!(
        "Total pipeline time: {:.2}s",
        pipeline_start.elapsed().as_secs_f64()
    );

    Ok(PipelineResult {
        audio_file,
        stem_directory,
        stems,
        separated,
        mixes,
        variants,
        manifest,
    })
}

/// Download the URL, or check the local input exists
fn acquire_source(settings: &Settings, downloader: &dyn AudioDownloader) -> Result<PathBuf> {
    match &settings.source {
        Source::Url(url) => {
            let spinner = stage_spinner(
                settings.show_progress,
                format!("Downloading with {}...", downloader.name()),
            );
            let result = downloader.download(url, &settings.download_dir);
            finish_spinner(spinner, &result);
            result
        }
        Source::File(path) => {
            if !path.is_file() {
                return Err(MinusOneError::FileNotFound(path.clone()));
            }
            debug!("Using local input {}", path.display());
            Ok(path.clone())
        }
    }
}

/// Separate `audio_file`, or reuse stems already on disk
///
/// Returns the stem directory and whether the separator ran.
fn separate(
    settings: &Settings,
    separator: &dyn StemSeparator,
    audio_file: &Path,
) -> Result<(PathBuf, bool)> {
    let stem_directory =
        resolve_stem_directory(&settings.output_dir, &audio_file.to_string_lossy())?;

    if !settings.force && has_preset_stems(&stem_directory, settings.stem_count) {
        info!(
            "Reusing stems in {} (use --force to separate again)",
            stem_directory.display()
        );
        return Ok((stem_directory, false));
    }

    // Stems from another run would end up in every mix
    discovery::clear_stem_directory(&stem_directory)?;

    let spinner = stage_spinner(
        settings.show_progress,
        format!(
            "Separating into {} with {}...",
            settings.stem_count,
            separator.name()
        ),
    );
    let result = separator.separate(audio_file, &settings.output_dir, settings.stem_count);
    finish_spinner(spinner, &result);

    Ok((result?, true))
}

/// True when `dir` holds exactly the stems of `stem_count`'s preset
fn has_preset_stems(dir: &Path, stem_count: StemCount) -> bool {
    if !dir.is_dir() {
        return false;
    }
    match discovery::scan_stems(dir) {
        Ok(set) => {
            let matches = set.names() == stem_count.stem_names();
            if !matches && !set.is_empty() {
                info!(
                    "Stems in {} ({}) do not match {}, separating again",
                    dir.display(),
                    set.names().join(", "),
                    stem_count
                );
            }
            matches
        }
        Err(_) => false,
    }
}

/// Pick the backing track in `stem_dir` and write its pitch variants
pub fn pitch_stem_directory(
    stem_dir: &Path,
    schedule: PitchSchedule,
    show_progress: bool,
) -> Result<Vec<PitchVariant>> {
    let target = select_pitch_target(stem_dir)?;
    info!("Pitch-shifting {}", target.display());
    PitchVariantGenerator::new(schedule)
        .with_progress(show_progress)
        .generate(&target)
}

/// `combine` subcommand: write mixes for an existing stem directory
pub fn run_combine(dir: &Path, dry_run: bool, show_progress: bool) -> Result<Vec<Mix>> {
    if !dir.is_dir() {
        return Err(MinusOneError::FileNotFound(dir.to_path_buf()));
    }
    let combiner = StemCombiner::new().with_progress(show_progress);

    if dry_run {
        let planned = combiner.plan(dir)?;
        print_plan_header();
        if planned.is_empty() {
            println!("Fewer than 3 stems in {}, nothing to combine", dir.display());
        } else {
            println!("Would create:");
            for path in &planned {
                println!("  {}", path.display());
            }
        }
        println!();
        return Ok(Vec::new());
    }

    combiner.combine(dir)
}

/// `pitch` subcommand: a file is shifted directly, a directory selects its backing track
pub fn run_pitch(
    path: &Path,
    schedule: PitchSchedule,
    dry_run: bool,
    show_progress: bool,
) -> Result<Vec<PitchVariant>> {
    let target = if path.is_dir() {
        select_pitch_target(path)?
    } else {
        path.to_path_buf()
    };

    if dry_run {
        let planned = PitchVariantGenerator::new(schedule).plan(&target)?;
        print_plan_header();
        println!("Would shift {}:", target.display());
        for path in &planned {
            println!("  {}", path.display());
        }
        println!();
        return Ok(Vec::new());
    }

    PitchVariantGenerator::new(schedule)
        .with_progress(show_progress)
        .generate(&target)
}

/// Dry run mode - show planned work without touching anything
fn run_dry_run(
    settings: &Settings,
    downloader: &dyn AudioDownloader,
    separator: &dyn StemSeparator,
) -> Result<PipelineResult> {
    print_plan_header();

    // The downloaded file name depends on the video title, which needs a request
    let audio_file = match &settings.source {
        Source::Url(url) => {
            println!("Download: {}", url);
            println!(
                "  via {} ({})",
                downloader.name(),
                availability(downloader.is_available())
            );
            println!("  into {}/<title>.wav", settings.download_dir.display());
            settings.download_dir.join("<title>.wav")
        }
        Source::File(path) => {
            println!("Input: {}", path.display());
            path.clone()
        }
    };
    println!();

    let stem_directory =
        resolve_stem_directory(&settings.output_dir, &audio_file.to_string_lossy())?;
    let reuse = !settings.force && has_preset_stems(&stem_directory, settings.stem_count);

    let stems: Vec<String> = if reuse {
        println!("Separate: reuse stems in {}", stem_directory.display());
        discovery::scan_stems(&stem_directory)?
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    } else {
        println!(
            "Separate: {} into {}",
            settings.stem_count,
            stem_directory.display()
        );
        println!(
            "  via {} ({})",
            separator.name(),
            availability(separator.is_available())
        );
        settings
            .stem_count
            .stem_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    };
    println!();

    println!("Would create:");
    if stems.len() >= MIN_STEMS_TO_COMBINE {
        for stem in &stems {
            let name = mix_file_name(stem, OUTPUT_EXTENSION);
            println!("  {}", stem_directory.join(name).display());
        }
    }

    if settings.pitch_enabled {
        // Mixes exist only after combine, so name the target the combine step will produce
        let target = if stems.iter().any(|s| s == "vocals")
            && stems.len() >= MIN_STEMS_TO_COMBINE
        {
            mix_file_name("vocals", OUTPUT_EXTENSION)
        } else {
            format!("accompaniment.{}", OUTPUT_EXTENSION)
        };
        for offset in settings.pitch_schedule.offsets() {
            let name = variant_file_name(&target, offset, OUTPUT_EXTENSION);
            println!("  {}", stem_directory.join(name).display());
        }
    }

    if settings.write_manifest {
        println!("  {}", stem_directory.join(MANIFEST_FILE_NAME).display());
    }
    println!();

    Ok(PipelineResult {
        audio_file,
        stem_directory,
        stems,
        ..Default::default()
    })
}

fn print_plan_header() {
    println!();
    println!("=== DRY RUN MODE ===");
    println!();
}

fn availability(available: bool) -> &'static str {
    if available {
        "available"
    } else {
        "not found"
    }
}

fn source_label(source: &Source) -> String {
    match source {
        Source::Url(url) => url.clone(),
        Source::File(path) => paths::stem_name(
            &path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        )
        .to_string(),
    }
}

/// Spinner for stages that give no progress of their own
fn stage_spinner(show: bool, message: String) -> Option<ProgressBar> {
    if !show {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    Some(pb)
}

fn finish_spinner<T>(spinner: Option<ProgressBar>, result: &Result<T>) {
    if let Some(pb) = spinner {
        match result {
            Ok(_) => pb.finish_with_message("done"),
            Err(_) => pb.abandon_with_message("failed"),
        }
    }
}
