//! Opening paths with the platform's default application.

use std::io;
use std::path::Path;
use std::process::Command;

use tracing::debug;

/// Open a path in the OS's default way.
///
/// Blocks until the opener command returns. A non-zero exit status from the
/// opener is not treated as an error; only failing to run it at all is.
pub fn open_with_default_app(path: &Path) -> io::Result<()> {
    let mut command = opener_command(path);
    debug!(path = %path.display(), "opening with default application");
    command.status()?;
    Ok(())
}

#[cfg(target_os = "windows")]
fn opener_command(path: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(path);
    command
}

#[cfg(target_os = "macos")]
fn opener_command(path: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(path);
    command
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn opener_command(path: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    command
}
