//! Document output to stdout or a file

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::CliError;

/// Where the rendered document goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    pub fn from_option(path: Option<&Path>) -> Self {
        match path {
            Some(p) if p != Path::new("-") => Self::File(p.to_path_buf()),
            _ => Self::Stdout,
        }
    }

    /// Writes `text` to the target.
    pub fn write(&self, text: &str) -> Result<(), CliError> {
        match self {
            Self::Stdout => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                write_to(&mut handle, text)?;
            }
            Self::File(path) => {
                std::fs::write(path, text)?;
                tracing::info!(path = %path.display(), bytes = text.len(), "document written");
            }
        }
        Ok(())
    }
}

/// Writes `text` and flushes.
pub fn write_to(w: &mut dyn Write, text: &str) -> std::io::Result<()> {
    w.write_all(text.as_bytes())?;
    w.flush()
}
