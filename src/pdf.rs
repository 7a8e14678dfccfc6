//! Converts rendered HTML into PDF bytes.
//!
//! The real conversion is done by an external program (WeasyPrint by default) that reads HTML on
//! stdin and writes a PDF on stdout. When `STATEMENT_IN_TEST_MODE` is set the app uses
//! `StandInEngine` instead, so the whole program can run without that program installed.

use crate::config::PdfSettings;
use crate::Result;
use anyhow::{bail, Context};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace};

const TEST_MODE_VAR: &str = "STATEMENT_IN_TEST_MODE";

/// Selects the PDF engine.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    /// Run the configured external program.
    #[default]
    Live,
    /// Use the in-process stand-in.
    Test,
}

impl Mode {
    /// `Mode::Test` when `STATEMENT_IN_TEST_MODE` is set to a non-empty value.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_VAR) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Live,
        }
    }
}

#[async_trait::async_trait]
pub trait PdfEngine: Send + Sync {
    /// Converts a complete HTML document to PDF bytes.
    async fn render(&self, html: &str) -> Result<Vec<u8>>;
}

/// Returns the engine for `mode`.
pub(crate) fn engine(settings: &PdfSettings, mode: Mode) -> Arc<dyn PdfEngine> {
    match mode {
        Mode::Live => Arc::new(ExternalEngine::new(settings)),
        Mode::Test => Arc::new(StandInEngine),
    }
}

/// Runs `program [args..] - -`, piping the HTML in and reading the PDF out.
#[derive(Debug, Clone)]
pub(crate) struct ExternalEngine {
    program: String,
    args: Vec<String>,
}

impl ExternalEngine {
    pub(crate) fn new(settings: &PdfSettings) -> Self {
        Self {
            program: settings.program.clone(),
            args: settings.args.clone(),
        }
    }
}

#[async_trait::async_trait]
impl PdfEngine for ExternalEngine {
    async fn render(&self, html: &str) -> Result<Vec<u8>> {
        trace!("Running {} {:?} - -", self.program, self.args);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .args(["-", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to run {}", self.program))?;

        // Fed from a separate task so a full stdout pipe cannot stall the write.
        let mut stdin = child
            .stdin
            .take()
            .context("The PDF program's stdin was not captured")?;
        let input = html.as_bytes().to_vec();
        let writer = tokio::spawn(async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        });

        let output = child
            .wait_with_output()
            .await
            .with_context(|| format!("Failed to read the output of {}", self.program))?;
        let written = writer.await.context("The HTML writer task failed")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{} failed (exit {}): {}",
                self.program,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
        }
        written.with_context(|| format!("Failed to send HTML to {}", self.program))?;
        if output.stdout.is_empty() {
            bail!("{} produced no output", self.program);
        }
        debug!("{} produced {} bytes", self.program, output.stdout.len());
        Ok(output.stdout)
    }
}

/// Produces a minimal PDF-shaped byte stream that carries the HTML as its body. Not a viewable
/// PDF.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct StandInEngine;

#[async_trait::async_trait]
impl PdfEngine for StandInEngine {
    async fn render(&self, html: &str) -> Result<Vec<u8>> {
        let mut pdf = b"%PDF-1.7\n".to_vec();
        pdf.extend_from_slice(html.as_bytes());
        pdf.extend_from_slice(b"\n%%EOF\n");
        Ok(pdf)
    }
}
