//! Host facilities: clipboard, external share command, printing.
//!
//! Callers treat every failure here as "no confirmation", never as fatal.
use std::{
    io::Write,
    path::Path,
    process::{Command, Stdio},
};

use log::debug;
use shell_words::split;

use crate::{CardError, Result};

fn facility_error(facility: &str, message: impl Into<String>) -> CardError {
    CardError::HostFacility {
        facility: facility.to_string(),
        message: message.into(),
    }
}

/// Splits a configured command line into a ready `Command`.
fn build_command(facility: &str, command_line: &str) -> Result<Command> {
    let args = split(command_line)
        .map_err(|e| facility_error(facility, format!("cannot parse command: {}", e)))?;

    let (program, rest) = args
        .split_first()
        .ok_or_else(|| facility_error(facility, "empty command"))?;

    let mut command = Command::new(program);
    command.args(rest);
    Ok(command)
}

/// Runs a command with `text` on its stdin and waits for it.
fn pipe_to(facility: &str, mut command: Command, text: &str) -> Result<()> {
    let mut child = command
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| facility_error(facility, format!("failed to spawn: {}", e)))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .map_err(|e| facility_error(facility, format!("failed to write: {}", e)))?;
    }

    let status = child
        .wait()
        .map_err(|e| facility_error(facility, format!("failed to wait: {}", e)))?;

    if status.success() {
        Ok(())
    } else {
        Err(facility_error(facility, format!("exited with {}", status)))
    }
}

/// Hands the text to a user-configured share command on stdin.
pub fn share_via_command(command_line: &str, text: &str) -> Result<()> {
    debug!("Sharing through command: {}", command_line);
    let command = build_command("share", command_line)?;
    pipe_to("share", command, text)
}

/// Copies text to the system clipboard in an OS-specific way.
/// - macOS: uses pbcopy
/// - Linux: uses xclip or xsel
/// - Windows: uses clip.exe
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let candidates: &[&str] = if cfg!(target_os = "macos") {
        &["pbcopy"]
    } else if cfg!(windows) {
        &["clip"]
    } else {
        &["xclip -selection clipboard", "xsel --clipboard --input", "wl-copy"]
    };

    let mut last_error = facility_error("clipboard", "not supported on this platform");
    for candidate in candidates {
        let command = build_command("clipboard", candidate)?;
        match pipe_to("clipboard", command, text) {
            Ok(()) => {
                debug!("Copied {} bytes with {}", text.len(), candidate);
                return Ok(());
            }
            Err(e) => {
                debug!("Clipboard helper {} failed: {}", candidate, e);
                last_error = e;
            }
        }
    }
    Err(last_error)
}

/// Invokes the print command with the document path as its last argument.
pub fn print_file(command_line: &str, path: &Path) -> Result<()> {
    debug!("Printing {} with {}", path.display(), command_line);
    let mut command = build_command("print", command_line)?;
    let status = command
        .arg(path)
        .status()
        .map_err(|e| facility_error("print", format!("failed to run: {}", e)))?;

    if status.success() {
        Ok(())
    } else {
        Err(facility_error("print", format!("exited with {}", status)))
    }
}
