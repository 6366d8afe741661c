//! OCR via the `tesseract` command-line program.
//!
//! Image bytes go in on stdin, recognised text comes back on stdout.
//! Any format tesseract's image loader understands works, JPEG included.

use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Instant;

use super::{OcrEngine, OcrError, OcrOutput};

pub struct TesseractEngine {
    command: String,
    lang: String,
}

impl TesseractEngine {
    pub fn new(command: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            lang: lang.into(),
        }
    }

    /// Check the engine is installed so a missing binary shows up at
    /// startup rather than on the first upload.
    pub fn warm_up(&self) -> bool {
        match which::which(&self.command) {
            Ok(path) => {
                log::info!("[OCR] Using {} ({})", path.display(), self.lang);
                true
            }
            Err(e) => {
                log::warn!("[OCR] '{}' not found on PATH: {}", self.command, e);
                false
            }
        }
    }

    fn run(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", self.lang.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => OcrError::Unavailable(self.command.clone()),
                _ => OcrError::Io(e),
            })?;

        // stdin is dropped at the end of the match so the child sees EOF.
        let sent = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(image_bytes),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;
        if let Err(e) = sent {
            return Err(OcrError::Failed(format!(
                "could not send image to {} ({}): {}",
                self.command,
                e,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if !output.status.success() {
            return Err(OcrError::Failed(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        &self.command
    }

    fn recognize(&self, image_bytes: &[u8]) -> Result<OcrOutput, OcrError> {
        let start = Instant::now();
        let text = self.run(image_bytes)?;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        log::info!(
            "[OCR] {} chars from {} bytes in {:.0}ms",
            text.trim().chars().count(),
            image_bytes.len(),
            latency_ms
        );
        Ok(OcrOutput::new(text, latency_ms))
    }
}
