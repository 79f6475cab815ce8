//! The single-slot filesystem mailbox.
//!
//! The external driver drops one `<name>.comm` file at a time into the
//! mailbox directory and waits for a zero-byte `good` or `bad` sentinel
//! before dropping the next. Nothing on the filesystem enforces the
//! single-slot contract; [`Mailbox::scan`] detects violations and the
//! loop treats them as fatal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use wirecheck_core::error::HarnessError;

/// Suffix marking a file as a pending command.
pub const COMMAND_SUFFIX: &str = ".comm";

/// Sentinel filename reporting success to the driver.
pub const GOOD_SENTINEL: &str = "good";

/// Sentinel filename reporting failure to the driver.
pub const BAD_SENTINEL: &str = "bad";

/// Command stem that terminates the loop.
pub const QUIT_COMMAND: &str = "quit";

/// Handle on the mailbox directory.
pub struct Mailbox {
    dir: PathBuf,
}

impl Mailbox {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if absent and clear any stale command or
    /// sentinel files. Idempotent: running it twice leaves the same
    /// empty-of-protocol-files state.
    pub fn setup(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.ends_with(COMMAND_SUFFIX) || name == GOOD_SENTINEL || name == BAD_SENTINEL {
                debug!(file = %name, "removing stale mailbox file");
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }

    /// Scan for the single pending command file.
    ///
    /// Returns `None` when the slot is empty. More than one `.comm` file
    /// is a [`HarnessError::MultipleCommands`] violation: the driver wrote
    /// a second command before consuming the previous result.
    pub fn scan(&self) -> Result<Option<PendingCommand>, HarnessError> {
        let mut found: Vec<PendingCommand> = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if let Some(stem) = name.strip_suffix(COMMAND_SUFFIX) {
                found.push(PendingCommand {
                    path: entry.path(),
                    stem: stem.to_string(),
                });
            }
        }

        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            n => Err(HarnessError::MultipleCommands(n)),
        }
    }

    /// Write the zero-byte result sentinel for the driver to consume.
    pub fn write_sentinel(&self, passed: bool) -> io::Result<()> {
        let name = if passed { GOOD_SENTINEL } else { BAD_SENTINEL };
        fs::write(self.dir.join(name), b"")
    }
}

/// One detected command file, not yet consumed.
#[derive(Debug)]
pub struct PendingCommand {
    path: PathBuf,
    stem: String,
}

impl PendingCommand {
    /// Filename minus the `.comm` suffix.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Read the file body. `send` and `read` carry their message payload
    /// here; the filename holds only the routing metadata.
    pub fn read_body(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }

    /// Convert into a guard that deletes the file when dropped, so the
    /// consumed command is cleaned up on every exit path from dispatch.
    pub fn into_guard(self) -> CommandGuard {
        CommandGuard { path: self.path }
    }
}

/// Deletes the consumed command file on drop.
#[derive(Debug)]
pub struct CommandGuard {
    path: PathBuf,
}

impl Drop for CommandGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), "failed to remove command file: {e}");
            }
        }
    }
}
