//! Browser executable probing and hidden launch
//!
//! Best-effort bootstrap: if no executable is found or the spawn fails,
//! the controller simply assumes a browser is already listening on the
//! debug port and later calls surface a clear not-connected error.
//! Headless is tried first; some sites and protocol features misbehave
//! under true headless, so a headless child that exits immediately is
//! retried as a minimized, off-screen visible window.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::process::{Child, Command};

/// Launch tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Skip probing and use this executable.
    pub executable: Option<PathBuf>,
    /// Dedicated profile directory. Defaults to a temp-dir subfolder so
    /// the user's real profile is never touched.
    pub user_data_dir: Option<PathBuf>,
    /// How long to wait before concluding the headless child crashed.
    pub fallback_delay: Duration,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            executable: None,
            user_data_dir: None,
            fallback_delay: Duration::from_millis(600),
        }
    }
}

/// Fixed probe order: Edge before Chrome, both Windows program-file
/// roots; standard install paths elsewhere.
fn executable_candidates() -> Vec<PathBuf> {
    if cfg!(target_os = "windows") {
        let x86 = std::env::var("ProgramFiles(x86)")
            .unwrap_or_else(|_| "C:/Program Files (x86)".into());
        let full = std::env::var("ProgramFiles").unwrap_or_else(|_| "C:/Program Files".into());
        vec![
            Path::new(&x86).join("Microsoft/Edge/Application/msedge.exe"),
            Path::new(&full).join("Microsoft/Edge/Application/msedge.exe"),
            Path::new(&full).join("Google/Chrome/Application/chrome.exe"),
            Path::new(&x86).join("Google/Chrome/Application/chrome.exe"),
        ]
    } else if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge"),
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ]
    } else {
        vec![
            PathBuf::from("/usr/bin/microsoft-edge"),
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/google-chrome-stable"),
            PathBuf::from("/usr/bin/chromium"),
            PathBuf::from("/usr/bin/chromium-browser"),
        ]
    }
}

/// First candidate that exists on disk. `None` is not an error: launch
/// just does not happen.
pub fn find_executable_path() -> Option<PathBuf> {
    executable_candidates().into_iter().find(|p| p.exists())
}

fn base_args(port: u16, user_data_dir: &Path) -> Vec<String> {
    vec![
        format!("--remote-debugging-port={port}"),
        format!("--user-data-dir={}", user_data_dir.display()),
    ]
}

fn headless_args(port: u16, user_data_dir: &Path) -> Vec<String> {
    let mut args = base_args(port, user_data_dir);
    args.push("--headless=new".into());
    args.push("--disable-gpu".into());
    args
}

/// Visible but unnoticeable: a 1x1 app window parked far off-screen,
/// started minimized.
fn hidden_window_args(port: u16, user_data_dir: &Path) -> Vec<String> {
    let mut args = base_args(port, user_data_dir);
    args.push("--app=data:,".into());
    args.push("--window-size=1,1".into());
    args.push("--window-position=-32000,-32000".into());
    args.push("--start-minimized".into());
    args
}

fn spawn_detached(exe: &Path, args: &[String]) -> std::io::Result<Child> {
    Command::new(exe)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
}

/// Handle to the spawned browser. Owned by the host application and
/// killed on shutdown (or drop), independent of any connection state.
pub struct BrowserProcess {
    child: Child,
}

impl BrowserProcess {
    pub async fn shutdown(mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::debug!("Browser process kill failed (may have exited): {}", e);
        }
    }
}

/// Fire-and-forget bootstrap: probe for an executable, spawn headless,
/// and if the child dies within the probe delay retry with the
/// hidden-window argument set. Every failure is swallowed.
pub async fn launch_hidden_browser(port: u16, config: &LaunchConfig) -> Option<BrowserProcess> {
    let exe = config.executable.clone().or_else(find_executable_path)?;

    let user_data_dir = config
        .user_data_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("browser-cdp-profile"));
    if let Err(e) = std::fs::create_dir_all(&user_data_dir) {
        tracing::warn!(
            "Could not create profile dir {}: {}",
            user_data_dir.display(),
            e
        );
        return None;
    }

    let mut child = match spawn_detached(&exe, &headless_args(port, &user_data_dir)) {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!("Headless launch of {} failed: {}", exe.display(), e);
            return None;
        }
    };

    tokio::time::sleep(config.fallback_delay).await;

    match child.try_wait() {
        // Still running - headless took.
        Ok(None) => Some(BrowserProcess { child }),
        Ok(Some(status)) => {
            tracing::info!(
                "Headless browser exited immediately ({status}); retrying with a hidden window"
            );
            match spawn_detached(&exe, &hidden_window_args(port, &user_data_dir)) {
                Ok(child) => Some(BrowserProcess { child }),
                Err(e) => {
                    tracing::warn!("Hidden-window launch failed: {}", e);
                    None
                }
            }
        }
        Err(e) => {
            tracing::warn!("Could not poll the browser process: {}", e);
            Some(BrowserProcess { child })
        }
    }
}
