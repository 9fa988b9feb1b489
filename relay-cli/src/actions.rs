//! GitHub Actions workflow commands
//!
//! Log groups, error annotations and step outputs, written in the formats the
//! Actions runner understands.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use uuid::Uuid;

/// Collapsible log group, closed when dropped
pub struct LogGroup;

impl LogGroup {
    pub fn start(title: &str) -> Self {
        println!("::group::{}", escape_data(title));
        LogGroup
    }
}

impl Drop for LogGroup {
    fn drop(&mut self) {
        println!("::endgroup::");
    }
}

/// Emits an error annotation for the step
pub fn annotate_error(message: &str) {
    println!("::error::{}", escape_data(message));
}

/// Escapes a workflow command payload
fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Writes step outputs to the runner's output file
#[derive(Debug, Clone, Default)]
pub struct OutputWriter {
    path: Option<PathBuf>,
}

impl OutputWriter {
    /// Creates a writer; without a path outputs are only logged
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Appends the given outputs
    ///
    /// Each value uses the delimited multi-line form so that any value,
    /// including one with newlines, round-trips unchanged.
    pub fn write(&self, outputs: &[(&str, String)]) -> Result<()> {
        for (name, value) in outputs {
            info!("Output {}={}", name, value);
        }

        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open output file {}", path.display()))?;

        let mut buffer = String::new();
        for (name, value) in outputs {
            buffer.push_str(&format_output(name, value));
        }

        file.write_all(buffer.as_bytes())
            .with_context(|| format!("Failed to write output file {}", path.display()))?;

        Ok(())
    }
}

fn format_output(name: &str, value: &str) -> String {
    let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}
