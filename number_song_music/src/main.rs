// Number Song generator: CLI entry point.
//
// Composes the piece, writes the Csound score (and optionally MIDI), then
// hands the score and an externally authored orchestra file to csound.
// The pipeline: configuration -> beat loop -> score text -> MIDI -> audio.
//
// Usage:
//   cargo run -p number_song_music -- [--config FILE] [--beats N]
//     [--score-out FILE] [--midi FILE] [--orc FILE] [--wav FILE]
//     [--csound PROGRAM] [--no-render] [--play]
//   cargo run -p number_song_music -- custom [--orc FILE] [--sco FILE]
//     [--wav FILE] [--csound PROGRAM] [--play]
//
// `custom` skips composition and renders an existing orchestra/score pair
// (custom.orc and custom.sco by default). Set RUST_LOG for more detail.

use number_song_music::composer::Composer;
use number_song_music::config::GeneratorConfig;
use number_song_music::error::Result;
use number_song_music::midi::write_midi;
use number_song_music::orchestra::VoiceRole;
use number_song_music::score::{render_score, score_header};
use number_song_music::synth::{CsoundCli, RenderTarget, render_all};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(LevelFilter::INFO.into()))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let result = if args.get(1).map(String::as_str) == Some("custom") {
        run_custom(&args)
    } else {
        run_generate(&args)
    };
    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run_generate(args: &[String]) -> Result<()> {
    let config_path: Option<PathBuf> = parse_flag(args, "--config");
    let score_out: PathBuf =
        parse_flag(args, "--score-out").unwrap_or_else(|| PathBuf::from("composition.sco"));
    let midi_out: Option<PathBuf> = parse_flag(args, "--midi");
    let orc_path: PathBuf = parse_flag(args, "--orc").unwrap_or_else(|| PathBuf::from("inst.orc"));
    let render = !has_flag(args, "--no-render");

    println!("=== Number Song Generator ===");

    println!("[1/5] Loading configuration...");
    let mut config = match &config_path {
        Some(path) => {
            let config = GeneratorConfig::load(path)?;
            println!("  Loaded {}.", path.display());
            config
        }
        None => {
            println!("  Using built-in configuration.");
            GeneratorConfig::default()
        }
    };
    if let Some(beats) = parse_flag(args, "--beats") {
        config.end_beat = beats;
        config.validate()?;
    }
    println!(
        "  Beats {}..{} at {} BPM ({:.0}s)",
        config.start_beat,
        config.end_beat,
        config.tempo_bpm,
        config.end_beat.saturating_sub(config.start_beat) as f64 * 60.0 / config.tempo_bpm as f64
    );

    println!("[2/5] Composing...");
    let mut orchestra = config.orchestra();
    let summary = Composer::default().compose(&mut orchestra, &config.composer_config())?;
    for role in VoiceRole::ALL {
        println!("  {:<10} {:>4} notes", role.name(), summary.accepted_for(role));
    }
    println!(
        "  {} notes total, {} dropped while a voice was busy.",
        summary.total_accepted(),
        summary.dropped
    );

    println!("[3/5] Writing score to {}...", score_out.display());
    let score = render_score(&score_header(config.tempo_bpm), &orchestra);
    std::fs::write(&score_out, &score)?;
    println!("  {} lines.", score.lines().count());

    match &midi_out {
        Some(path) => {
            println!("[4/5] Writing MIDI to {}...", path.display());
            write_midi(&orchestra, config.tempo_bpm, path)?;
        }
        None => println!("[4/5] MIDI output not requested."),
    }

    if render {
        println!("[5/5] Rendering with csound...");
        let orchestra_text = std::fs::read_to_string(&orc_path)?;
        synthesize(args, &orchestra_text, &score)?;
    } else {
        println!("[5/5] Rendering skipped.");
    }

    println!();
    println!("Done.");
    Ok(())
}

fn run_custom(args: &[String]) -> Result<()> {
    let orc_path: PathBuf =
        parse_flag(args, "--orc").unwrap_or_else(|| PathBuf::from("custom.orc"));
    let sco_path: PathBuf =
        parse_flag(args, "--sco").unwrap_or_else(|| PathBuf::from("custom.sco"));

    println!("=== Number Song Generator (custom) ===");
    println!(
        "[1/2] Reading {} and {}...",
        orc_path.display(),
        sco_path.display()
    );
    let orchestra_text = std::fs::read_to_string(&orc_path)?;
    let score = std::fs::read_to_string(&sco_path)?;

    println!("[2/2] Rendering with csound...");
    synthesize(args, &orchestra_text, &score)?;
    println!("Done.");
    Ok(())
}

/// Render to the WAV file, then to the speakers if `--play` was given.
fn synthesize(args: &[String], orchestra_text: &str, score: &str) -> Result<()> {
    let wav: PathBuf =
        parse_flag(args, "--wav").unwrap_or_else(|| PathBuf::from("composition.wav"));
    let program: PathBuf =
        parse_flag(args, "--csound").unwrap_or_else(|| PathBuf::from("csound"));
    let work_dir = std::env::current_dir()?.join(Path::new("target").join("number_song"));
    let engine = CsoundCli::new(program, work_dir);

    let mut targets = vec![RenderTarget::File(wav.clone())];
    if has_flag(args, "--play") {
        targets.push(RenderTarget::Dac);
    }
    render_all(&engine, orchestra_text, score, &targets)?;
    println!("  Wrote {}.", wav.display());
    Ok(())
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
