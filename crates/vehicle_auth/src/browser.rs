use std::io;
use std::process::{Command, Stdio};

/// Program and arguments used to open `url` in the desktop browser.
pub fn browser_command(url: &str) -> (&'static str, Vec<String>) {
    let windows = std::env::var("OS").is_ok_and(|value| value == "Windows_NT");
    if windows {
        (
            "rundll32",
            vec!["url.dll,FileProtocolHandler".to_string(), url.to_string()],
        )
    } else if cfg!(target_os = "macos") {
        ("open", vec![url.to_string()])
    } else {
        ("xdg-open", vec![url.to_string()])
    }
}

/// Launch the platform browser opener and wait for it to hand off.
pub fn open_browser(url: &str) -> io::Result<()> {
    let (program, args) = browser_command(url);
    let status = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("{program} exited with {status}")))
    }
}
