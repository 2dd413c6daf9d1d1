//! Spleeter integration for source separation

use super::process::Tool;
use crate::error::{MinusOneError, Result};
use crate::paths::resolve_stem_directory;
use crate::traits::StemSeparator;
use crate::types::StemCount;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable overriding the spleeter binary
pub const SPLEETER_ENV: &str = "MINUSONE_SPLEETER";

/// Codec spleeter writes stems in
const STEM_CODEC: &str = "wav";

/// Runs `spleeter separate`, which writes `<output_base>/<input name>/<stem>.wav`
pub struct SpleeterSeparator {
    tool: Tool,
}

impl SpleeterSeparator {
    pub fn new() -> Self {
        Self {
            tool: Tool::from_env("spleeter", SPLEETER_ENV, "spleeter"),
        }
    }
}

impl Default for SpleeterSeparator {
    fn default() -> Self {
        Self::new()
    }
}

impl StemSeparator for SpleeterSeparator {
    fn separate(&self, input: &Path, output_base: &Path, stems: StemCount) -> Result<PathBuf> {
        if !input.is_file() {
            return Err(MinusOneError::FileNotFound(input.to_path_buf()));
        }
        let stem_dir = resolve_stem_directory(output_base, &input.to_string_lossy())?;

        std::fs::create_dir_all(output_base)
            .map_err(|e| MinusOneError::output_error(output_base, e))?;

        info!(
            "Separating {} into {} with spleeter",
            input.display(),
            stems
        );

        let mut cmd = self.tool.command();
        cmd.args(["separate", "-c", STEM_CODEC, "-o"])
            .arg(output_base)
            .arg("-p")
            .arg(format!("spleeter:{}", stems))
            .arg(input);
        self.tool.run(&mut cmd)?;

        if !stem_dir.is_dir() {
            return Err(MinusOneError::ToolFailed {
                tool: self.tool.name,
                status: "success".to_string(),
                stderr: format!("stem directory {} was not created", stem_dir.display()),
            });
        }

        info!("Stems written to {}", stem_dir.display());
        Ok(stem_dir)
    }

    fn is_available(&self) -> bool {
        // spleeter has no --version flag; --help exits zero when installed
        self.tool
            .command()
            .arg("--help")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "spleeter"
    }
}
