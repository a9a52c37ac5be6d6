use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Represents a Chrome/Chromium executable.
pub(crate) enum Chrome {
    /// A directly executable binary.
    Binary { path: PathBuf },
    /// A Flatpak-installed application.
    Flatpak { flatpak: PathBuf, app_id: String },
}

impl Chrome {
    pub(crate) fn discover() -> Result<Self> {
        // TODO: What are the executable names on Windows? macOS?
        let executables = ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser", "chrome"];
        for exe in executables {
            if let Ok(path) = which::which(exe) {
                tracing::debug!(chrome = %path.display(), "Discovered Chrome executable");
                return Ok(Self::Binary { path });
            }
        }
        tracing::info!("Chrome executable not found in PATH");
        if let Ok(flatpak) = which::which("flatpak") {
            tracing::trace!(flatpak = %flatpak.display(), "Discovered Flatpak on system; searching installed apps");
            let flatpak_apps = ["com.google.Chrome", "org.chromium.Chromium"];
            for app_id in flatpak_apps {
                if Command::new(&flatpak).args(["info", app_id]).output().is_ok_and(|o| o.status.success()) {
                    return Ok(Self::Flatpak { flatpak, app_id: app_id.to_string() });
                }
            }
        } else {
            tracing::info!("Flatpak not found; skipping containerized Chrome checks.");
        }
        exn::bail!(ErrorKind::ChromeNotFound);
    }

    fn command(&self) -> Command {
        match self {
            Self::Binary { path } => Command::new(path),
            Self::Flatpak { flatpak, app_id } => {
                let mut command = Command::new(flatpak);
                command.args(["run", "--filesystem=host", app_id]);
                command
            },
        }
    }

    /// Print the HTML file at `input` to a PDF at `output`.
    pub(crate) fn print_to_pdf(&self, input: &Path, output: &Path, timeout: Duration) -> Result<()> {
        let mut child = self
            .command()
            .args(["--headless", "--disable-gpu", "--no-pdf-header-footer"])
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(format!("file://{}", input.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .or_raise(|| ErrorKind::Io)?;
        let deadline = Instant::now() + timeout;
        let status = loop {
            if let Some(status) = child.try_wait().or_raise(|| ErrorKind::Io)? {
                break status;
            }
            if Instant::now() >= deadline {
                _ = child.kill();
                _ = child.wait();
                exn::bail!(ErrorKind::ChromeTimeout);
            }
            std::thread::sleep(POLL_INTERVAL);
        };
        if !status.success() {
            exn::bail!(ErrorKind::ChromeFailed(status.code().unwrap_or(-1)));
        }
        if !output.exists() {
            exn::bail!(ErrorKind::ChromeFailed(0));
        }
        Ok(())
    }
}
