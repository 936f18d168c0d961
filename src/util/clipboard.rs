use std::io::{self, Write};
use std::process::{Command, Stdio};

/// Program and arguments that read the clipboard contents from stdin.
fn copy_command() -> Option<(&'static str, &'static [&'static str])> {
    if cfg!(target_os = "macos") {
        Some(("pbcopy", &[]))
    } else if cfg!(target_os = "linux") {
        Some(("xclip", &["-selection", "clipboard"]))
    } else {
        None
    }
}

/// Put `text` on the system clipboard.
pub fn clipboard_set(text: &str) -> io::Result<()> {
    let Some((program, args)) = copy_command() else {
        return Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "no clipboard command for this platform",
        ));
    };
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }
    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("{} exited with {}", program, status)))
    }
}
