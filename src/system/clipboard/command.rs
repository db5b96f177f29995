//! Fallback copy through a platform helper program (`pbcopy`, `clip`, `wl-copy`, `xclip`).
//!
//! The text is piped into the helper's stdin and the helper's exit status is the result.
//! The helper process is always waited on, even when writing to it failed.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use super::{ClipboardError, TextSink};

pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Picks the copy helper for the current platform.
    pub fn detect() -> Self {
        #[cfg(target_os = "macos")]
        {
            Self::new("pbcopy", &[])
        }

        #[cfg(target_os = "windows")]
        {
            Self::new("clip", &[])
        }

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            if std::env::var_os("WAYLAND_DISPLAY").is_some() {
                Self::new("wl-copy", &[])
            } else {
                Self::new("xclip", &["-selection", "clipboard"])
            }
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

/// True when `program` names an existing file directly, or one of the `PATH`
/// directories holds it.
fn program_exists(program: &str) -> bool {
    let direct = Path::new(program);
    if direct.components().count() > 1 {
        return direct.is_file();
    }
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| {
        let candidate = dir.join(program);
        candidate.is_file() || (cfg!(windows) && candidate.with_extension("exe").is_file())
    })
}

impl TextSink for CommandClipboard {
    fn name(&self) -> &'static str {
        "helper"
    }

    fn is_available(&self) -> bool {
        let found = program_exists(&self.program);
        if !found {
            debug!(program = %self.program, "Copy helper not found");
        }
        found
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        debug!(program = %self.program, "Copying through helper");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let written = match child.stdin.take() {
            // stdin is dropped at the end of this arm so the helper sees EOF.
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "helper stdin unavailable")),
        };
        if written.is_err() {
            let _ = child.kill();
        }
        let status = child.wait()?;
        written?;

        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::Rejected {
                program: self.program.clone(),
                code: status.code(),
            })
        }
    }
}
