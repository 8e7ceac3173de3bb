use std::path::PathBuf;
use std::time::Duration;

use windows::core::{Interface, PCWSTR, PWSTR, VARIANT};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX_LOCAL_SERVER,
    COINIT_APARTMENTTHREADED,
};
use windows::Win32::UI::Shell::{IShellWindows, PathCreateFromUrlW, ShellWindows};
use windows::Win32::Web::InternetExplorer::IWebBrowserApp;

use crate::ops::PathSource;
use crate::probe;
use crate::registry::WindowId;
use crate::win_util;

/// Resolves an Explorer frame's displayed folder through the shell's
/// `ShellWindows` automation collection. Each call initialises COM for the
/// calling thread, because resolution runs on short-lived worker threads.
pub struct ShellPathSource {
    probe_timeout: Duration,
}

impl ShellPathSource {
    pub fn new(probe_timeout: Duration) -> Self {
        Self { probe_timeout }
    }
}

impl PathSource for ShellPathSource {
    fn resolve(&self, browser: WindowId) -> Option<PathBuf> {
        // The automation call round-trips through Explorer itself. If its
        // message loop is stalled, skip this attempt instead of hanging.
        if !probe::is_responsive(browser, self.probe_timeout) {
            tracing::debug!(%browser, "browser unresponsive, skipping resolution attempt");
            return None;
        }
        unsafe {
            let _ = CoInitializeEx(None, COINIT_APARTMENTTHREADED);
            let path = resolve_active_tab(browser);
            CoUninitialize();
            path
        }
    }
}

/// Walk every open shell browser instance and pick the one hosted by `browser`
/// whose tab name appears in the frame's title. An Explorer frame hosts one
/// shell instance per tab but carries only the active tab's name in its title
/// (possibly with a localized " - File Explorer" suffix), so substring
/// containment selects the active tab. The first match by enumeration order
/// wins.
unsafe fn resolve_active_tab(browser: WindowId) -> Option<PathBuf> {
    let title = win_util::window_text(win_util::hwnd(browser));
    if title.is_empty() {
        return None;
    }

    let shell: IShellWindows = match CoCreateInstance(&ShellWindows, None, CLSCTX_LOCAL_SERVER) {
        Ok(shell) => shell,
        Err(err) => {
            tracing::warn!(%err, "ShellWindows unavailable");
            return None;
        }
    };
    let count = shell.Count().unwrap_or(0);
    for i in 0..count {
        let Ok(disp) = shell.Item(&VARIANT::from(i)) else {
            continue;
        };
        let Ok(app) = disp.cast::<IWebBrowserApp>() else {
            continue;
        };
        let Ok(frame) = app.HWND() else {
            continue;
        };
        if frame.0 != browser.0 {
            continue;
        }
        let Ok(tab_name) = app.LocationName() else {
            continue;
        };
        let tab_name = tab_name.to_string();
        if tab_name.is_empty() || !title.contains(&tab_name) {
            continue;
        }
        let Ok(url) = app.LocationURL() else {
            continue;
        };
        if let Some(path) = file_url_to_path(&url.to_string()) {
            return Some(path);
        }
    }
    None
}

/// Convert a `file://` location URL into a filesystem path. Non-file
/// locations (This PC, Control Panel, network roots) yield `None`.
fn file_url_to_path(url: &str) -> Option<PathBuf> {
    if url.is_empty() {
        return None;
    }
    let wide_url = win_util::to_wide(url);
    let mut buf = vec![0u16; 1024];
    let mut len = buf.len() as u32;
    unsafe {
        PathCreateFromUrlW(
            PCWSTR(wide_url.as_ptr()),
            PWSTR(buf.as_mut_ptr()),
            &mut len,
            0,
        )
        .ok()?;
    }
    if len == 0 {
        return None;
    }
    Some(PathBuf::from(String::from_utf16_lossy(&buf[..len as usize])))
}
