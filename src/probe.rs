use std::time::Duration;

use windows::Win32::Foundation::{LPARAM, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    SendMessageTimeoutW, SMTO_ABORTIFHUNG, SMTO_BLOCK, WM_NULL,
};

use crate::registry::WindowId;
use crate::win_util;

/// Bounded check that the window's message loop is currently being serviced.
/// Sends WM_NULL and waits up to `timeout` for it to be dispatched. A `true`
/// answer makes a follow-up shell automation call unlikely to hang; it does
/// not guarantee it.
pub fn is_responsive(id: WindowId, timeout: Duration) -> bool {
    if !win_util::is_window(id) {
        return false;
    }
    let mut result: usize = 0;
    let outcome = unsafe {
        SendMessageTimeoutW(
            win_util::hwnd(id),
            WM_NULL,
            WPARAM(0),
            LPARAM(0),
            SMTO_ABORTIFHUNG | SMTO_BLOCK,
            timeout.as_millis() as u32,
            Some(&mut result as *mut usize),
        )
    };
    outcome.0 != 0
}
