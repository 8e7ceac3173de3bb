use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::{
    GetClassNameW, GetWindowTextLengthW, GetWindowTextW, IsWindow, IsWindowVisible,
};

use crate::registry::WindowId;

/// Window class of a File Explorer frame.
pub const TARGET_WINDOW_CLASS: &str = "CabinetWClass";

pub fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

pub fn hwnd(id: WindowId) -> HWND {
    HWND(id.0 as *mut core::ffi::c_void)
}

pub fn window_id(hwnd: HWND) -> WindowId {
    WindowId(hwnd.0 as isize)
}

pub fn is_window(id: WindowId) -> bool {
    unsafe { IsWindow(hwnd(id)).as_bool() }
}

pub fn is_window_visible(id: WindowId) -> bool {
    unsafe { IsWindowVisible(hwnd(id)).as_bool() }
}

pub fn window_text(hwnd: HWND) -> String {
    unsafe {
        let len = GetWindowTextLengthW(hwnd);
        if len <= 0 {
            return String::new();
        }
        let mut buf = vec![0u16; len as usize + 1];
        let read = GetWindowTextW(hwnd, &mut buf);
        String::from_utf16_lossy(&buf[..read as usize])
    }
}

pub fn window_class(hwnd: HWND) -> String {
    unsafe {
        let mut buf = [0u16; 256];
        let len = GetClassNameW(hwnd, &mut buf);
        if len <= 0 {
            return String::new();
        }
        String::from_utf16_lossy(&buf[..len as usize])
    }
}

pub fn is_target_class(hwnd: HWND) -> bool {
    window_class(hwnd) == TARGET_WINDOW_CLASS
}
