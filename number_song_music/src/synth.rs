// Synthesis engine boundary.
//
// Rendering audio is delegated to an external engine that takes two text
// blobs, an orchestra definition and a score, and writes to an output
// target. The orchestra text is authored outside this crate and passed
// through untouched.
//
// `CsoundCli` drives the `csound` command-line program: both blobs are
// written to files in a working directory and the program is run once per
// target. Anything that implements `SynthesisEngine` can stand in for it
// (tests use a recording stub).

use crate::error::{Result, ScoreError};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Where rendered audio goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTarget {
    /// A sound file, format chosen by the engine from the extension.
    File(PathBuf),
    /// Real-time playback on the default audio device.
    Dac,
}

impl RenderTarget {
    /// The `-o` option value csound expects for this target.
    pub fn output_option(&self) -> String {
        match self {
            RenderTarget::File(path) => format!("-o{}", path.display()),
            RenderTarget::Dac => "-odac".to_string(),
        }
    }
}

pub trait SynthesisEngine {
    /// Render `score` with the instruments in `orchestra` to `target`.
    fn render(&self, orchestra: &str, score: &str, target: &RenderTarget) -> Result<()>;
}

/// Runs the `csound` executable.
#[derive(Debug, Clone)]
pub struct CsoundCli {
    pub program: PathBuf,
    /// Directory for the orchestra and score files handed to the program.
    pub work_dir: PathBuf,
}

impl Default for CsoundCli {
    fn default() -> Self {
        CsoundCli {
            program: PathBuf::from("csound"),
            work_dir: std::env::temp_dir(),
        }
    }
}

impl CsoundCli {
    pub fn new(program: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        CsoundCli {
            program: program.into(),
            work_dir: work_dir.into(),
        }
    }

    fn stage(&self, orchestra: &str, score: &str) -> Result<(PathBuf, PathBuf)> {
        std::fs::create_dir_all(&self.work_dir)?;
        let orc_path = self.work_dir.join("number_song.orc");
        let sco_path = self.work_dir.join("number_song.sco");
        std::fs::write(&orc_path, orchestra)?;
        std::fs::write(&sco_path, score)?;
        Ok((orc_path, sco_path))
    }

    fn run(&self, orc_path: &Path, sco_path: &Path, target: &RenderTarget) -> Result<()> {
        debug!(
            program = %self.program.display(),
            output = %target.output_option(),
            "starting synthesis engine"
        );
        let output = Command::new(&self.program)
            .arg(target.output_option())
            .arg(orc_path)
            .arg(sco_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                ScoreError::Synthesis(format!(
                    "could not start {}: {e}",
                    self.program.display()
                ))
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
            return Err(ScoreError::Synthesis(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                tail.into_iter().rev().collect::<Vec<_>>().join(" | ")
            )));
        }
        info!(output = %target.output_option(), "synthesis finished");
        Ok(())
    }
}

impl SynthesisEngine for CsoundCli {
    fn render(&self, orchestra: &str, score: &str, target: &RenderTarget) -> Result<()> {
        let (orc_path, sco_path) = self.stage(orchestra, score)?;
        self.run(&orc_path, &sco_path, target)
    }
}

/// Render to every target in order, stopping at the first failure.
pub fn render_all(
    engine: &dyn SynthesisEngine,
    orchestra: &str,
    score: &str,
    targets: &[RenderTarget],
) -> Result<()> {
    for target in targets {
        engine.render(orchestra, score, target)?;
    }
    Ok(())
}
