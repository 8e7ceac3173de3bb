use anyhow::Context;
use windows::core::PCWSTR;
use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, CreateFontW, CreateSolidBrush, DeleteObject, DrawTextW, EndPaint, FillRect,
    GetStockObject, InvalidateRect, SetBkMode, SetTextColor, CLIP_DEFAULT_PRECIS, DEFAULT_CHARSET,
    DEFAULT_QUALITY, DT_CENTER, DT_SINGLELINE, DT_VCENTER, FONT_PITCH_AND_FAMILY, HBRUSH, HFONT,
    OUT_DEFAULT_PRECIS, PAINTSTRUCT, TRANSPARENT, WHITE_BRUSH,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DrawFrameControl, GetClientRect, GetWindowLongPtrW,
    GetWindowTextLengthW, GetWindowTextW, LoadCursorW, MoveWindow, PostQuitMessage, RegisterClassW,
    SendMessageW, SetLayeredWindowAttributes, SetWindowLongPtrW, SetWindowTextW, ShowWindow,
    DFCS_CAPTIONCLOSE, DFCS_CAPTIONMAX, DFCS_CAPTIONMIN, DFC_CAPTION, EN_CHANGE, ES_AUTOVSCROLL,
    ES_LEFT, ES_MULTILINE, GWLP_USERDATA, HMENU, IDC_ARROW, LWA_ALPHA, SW_HIDE, SW_SHOW,
    WINDOW_EX_STYLE, WINDOW_STYLE, WM_APP, WM_COMMAND, WM_CREATE, WM_CTLCOLOREDIT, WM_LBUTTONDOWN,
    WM_MOUSEWHEEL, WM_NCDESTROY, WM_PAINT, WM_SETFONT, WM_SIZE, WNDCLASSW, WS_CHILD,
    WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_POPUP, WS_VSCROLL,
};

use crate::engine;
use crate::events::EventKind;
use crate::notes;
use crate::registry::TrackedPair;
use crate::win_util::{self, to_wide};

pub const OVERLAY_CLASS: &str = "FolderMemoOverlay";

/// Posted by a path-finder worker once the registry holds its result.
/// wparam: 1 when the memo file exists.
pub const WM_APP_PATH_RESOLVED: u32 = WM_APP + 1;
/// Posted by the cooldown's deferred-retry path. lparam: raw `EventKind`.
pub const WM_APP_SAFETY_RECHECK: u32 = WM_APP + 2;

const ID_MEMO_EDIT: isize = 101;
const TITLE_BAR_HEIGHT: i32 = 25;
const BTN_SIZE: i32 = 25;
const OVERLAY_ALPHA: u8 = 240;
const MK_CONTROL_BIT: usize = 0x0008;
const FONT_STEP: u32 = 2;

/// Per-overlay native state, owned through GWLP_USERDATA. Touched only on the
/// UI thread.
struct OverlayState {
    edit: HWND,
    font: HFONT,
}

pub fn register_class() -> anyhow::Result<()> {
    unsafe {
        let hinstance = GetModuleHandleW(None)?;
        let class_name = to_wide(OVERLAY_CLASS);
        let wc = WNDCLASSW {
            lpfnWndProc: Some(overlay_proc),
            hInstance: hinstance.into(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            hbrBackground: HBRUSH(GetStockObject(WHITE_BRUSH).0),
            hCursor: LoadCursorW(None, IDC_ARROW)?,
            ..Default::default()
        };
        if RegisterClassW(&wc) == 0 {
            anyhow::bail!("overlay window class registration failed");
        }
    }
    Ok(())
}

/// Create a hidden overlay window owned by the given Explorer frame. The
/// owner relationship keeps the overlay stacked above its Explorer window
/// without forcing topmost.
pub fn create(owner: HWND) -> anyhow::Result<HWND> {
    unsafe {
        let hinstance = GetModuleHandleW(None)?;
        let class_name = to_wide(OVERLAY_CLASS);
        let title = to_wide("Memo");
        let hwnd = CreateWindowExW(
            WS_EX_TOOLWINDOW | WS_EX_LAYERED | WS_EX_NOACTIVATE,
            PCWSTR(class_name.as_ptr()),
            PCWSTR(title.as_ptr()),
            WS_POPUP,
            0,
            0,
            40,
            40,
            owner,
            None,
            hinstance,
            None,
        )
        .context("overlay window creation")?;
        SetLayeredWindowAttributes(hwnd, COLORREF(0), OVERLAY_ALPHA, LWA_ALPHA)?;
        Ok(hwnd)
    }
}

/// Show or hide the memo edit child, used when the overlay flips between
/// badge and panel mode.
pub fn set_edit_visible(overlay: HWND, visible: bool) {
    if let Some(state) = state_of(overlay) {
        unsafe {
            let _ = ShowWindow(state.edit, if visible { SW_SHOW } else { SW_HIDE });
        }
    }
}

fn state_of(hwnd: HWND) -> Option<&'static mut OverlayState> {
    unsafe {
        let ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut OverlayState;
        ptr.as_mut()
    }
}

fn lookup_pair(hwnd: HWND) -> Option<TrackedPair> {
    engine::get()?.registry.find_by_overlay(win_util::window_id(hwnd))
}

fn make_font(size: u32) -> HFONT {
    let face = to_wide("Segoe UI");
    unsafe {
        CreateFontW(
            size as i32,
            0,
            0,
            0,
            400,
            0,
            0,
            0,
            DEFAULT_CHARSET,
            OUT_DEFAULT_PRECIS,
            CLIP_DEFAULT_PRECIS,
            DEFAULT_QUALITY,
            FONT_PITCH_AND_FAMILY(0),
            PCWSTR(face.as_ptr()),
        )
    }
}

fn apply_font(state: &mut OverlayState, size: u32) {
    let font = make_font(size);
    unsafe {
        SendMessageW(state.edit, WM_SETFONT, WPARAM(font.0 as usize), LPARAM(1));
        let _ = DeleteObject(state.font);
    }
    state.font = font;
}

fn edit_text(edit: HWND) -> String {
    unsafe {
        let len = GetWindowTextLengthW(edit);
        if len <= 0 {
            return String::new();
        }
        let mut buf = vec![0u16; len as usize + 1];
        let read = GetWindowTextW(edit, &mut buf);
        String::from_utf16_lossy(&buf[..read as usize])
    }
}

fn set_edit_text(edit: HWND, text: &str) {
    let wide = to_wide(text);
    unsafe {
        let _ = SetWindowTextW(edit, PCWSTR(wide.as_ptr()));
    }
}

/// Reload the memo editor from the pair's resolved folder, or clear it when
/// nothing is resolved yet.
fn reload_memo(state: &mut OverlayState, pair: &TrackedPair) {
    let text = match (&pair.resolved_path, pair.note_exists) {
        (Some(folder), true) => notes::load(folder).unwrap_or_else(|err| {
            tracing::warn!(%err, "memo load failed");
            String::new()
        }),
        _ => String::new(),
    };
    set_edit_text(state.edit, &text);
}

fn autosave(hwnd: HWND, state: &OverlayState) {
    let Some(pair) = lookup_pair(hwnd) else {
        return;
    };
    let Some(folder) = pair.resolved_path else {
        return;
    };
    if !pair.note_exists {
        return;
    }
    if let Err(err) = notes::save(&folder, &edit_text(state.edit)) {
        tracing::warn!(%err, "memo save failed");
    }
}

fn paint(hwnd: HWND) {
    unsafe {
        let mut ps = PAINTSTRUCT::default();
        let hdc = BeginPaint(hwnd, &mut ps);
        let mut rc = RECT::default();
        let _ = GetClientRect(hwnd, &mut rc);

        match lookup_pair(hwnd) {
            Some(pair) if !pair.note_exists => {
                // No memo yet: green creation badge.
                fill(hdc, &rc, 50, 205, 50);
                draw_glyph(hdc, &mut rc, "+");
            }
            Some(pair) if pair.collapsed => {
                fill(hdc, &rc, 100, 100, 255);
                draw_glyph(hdc, &mut rc, "o");
            }
            Some(_) => {
                // Panel mode: title strip with expand/collapse/close boxes.
                let strip = RECT {
                    left: 0,
                    top: 0,
                    right: rc.right,
                    bottom: TITLE_BAR_HEIGHT,
                };
                fill(hdc, &strip, 230, 230, 230);
                let mut close = RECT {
                    left: rc.right - BTN_SIZE,
                    top: 0,
                    right: rc.right,
                    bottom: BTN_SIZE,
                };
                let _ = DrawFrameControl(hdc, &mut close, DFC_CAPTION, DFCS_CAPTIONCLOSE);
                let mut collapse = RECT {
                    left: rc.right - BTN_SIZE * 2,
                    top: 0,
                    right: rc.right - BTN_SIZE,
                    bottom: BTN_SIZE,
                };
                let _ = DrawFrameControl(hdc, &mut collapse, DFC_CAPTION, DFCS_CAPTIONMIN);
                let mut expand = RECT {
                    left: rc.right - BTN_SIZE * 3,
                    top: 0,
                    right: rc.right - BTN_SIZE * 2,
                    bottom: BTN_SIZE,
                };
                let _ = DrawFrameControl(hdc, &mut expand, DFC_CAPTION, DFCS_CAPTIONMAX);
            }
            None => {}
        }
        let _ = EndPaint(hwnd, &ps);
    }
}

unsafe fn fill(hdc: windows::Win32::Graphics::Gdi::HDC, rc: &RECT, r: u8, g: u8, b: u8) {
    let brush = CreateSolidBrush(COLORREF(u32::from(r) | u32::from(g) << 8 | u32::from(b) << 16));
    FillRect(hdc, rc, brush);
    let _ = DeleteObject(brush);
}

unsafe fn draw_glyph(hdc: windows::Win32::Graphics::Gdi::HDC, rc: &mut RECT, glyph: &str) {
    SetBkMode(hdc, TRANSPARENT);
    SetTextColor(hdc, COLORREF(0x00ff_ffff));
    let mut wide: Vec<u16> = glyph.encode_utf16().collect();
    DrawTextW(hdc, &mut wide, rc, DT_CENTER | DT_VCENTER | DT_SINGLELINE);
}

fn sync_and_repaint(hwnd: HWND) {
    if let (Some(engine), Some(pair)) = (engine::get(), lookup_pair(hwnd)) {
        engine.ops.sync_position(&pair);
    }
    unsafe {
        let _ = InvalidateRect(hwnd, None, true);
    }
}

fn on_create(hwnd: HWND) -> LRESULT {
    unsafe {
        let hinstance = GetModuleHandleW(None).unwrap_or_default();
        let edit_class = to_wide("EDIT");
        let style = WS_CHILD
            | WS_VSCROLL
            | WINDOW_STYLE((ES_LEFT | ES_MULTILINE | ES_AUTOVSCROLL) as u32);
        let edit = match CreateWindowExW(
            WINDOW_EX_STYLE(0),
            PCWSTR(edit_class.as_ptr()),
            PCWSTR::null(),
            style,
            0,
            0,
            0,
            0,
            hwnd,
            HMENU(ID_MEMO_EDIT as *mut core::ffi::c_void),
            hinstance,
            None,
        ) {
            Ok(edit) => edit,
            Err(err) => {
                tracing::warn!(%err, "memo edit control creation failed");
                return LRESULT(0);
            }
        };
        let size = engine::get().map(|e| e.settings.font_size).unwrap_or(16);
        let mut state = Box::new(OverlayState {
            edit,
            font: HFONT::default(),
        });
        apply_font(&mut state, crate::registry::clamp_font_size(size));
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, Box::into_raw(state) as isize);
    }
    LRESULT(0)
}

fn on_left_click(hwnd: HWND, x: i32, y: i32) {
    let Some(engine) = engine::get() else {
        return;
    };
    let Some(pair) = lookup_pair(hwnd) else {
        return;
    };
    let overlay = win_util::window_id(hwnd);

    if !pair.note_exists {
        // Creation badge: make the memo file, then re-resolve so the state
        // change flows back through the normal completion path.
        if let Some(folder) = pair.resolved_path.as_deref() {
            match notes::create_empty(folder) {
                Ok(()) => engine.router.request_resolve(pair.browser),
                Err(err) => tracing::warn!(%err, "memo creation failed"),
            }
        }
        return;
    }

    if pair.collapsed {
        engine.registry.update_by_overlay(overlay, |p| p.collapsed = false);
        sync_and_repaint(hwnd);
        return;
    }

    if y >= TITLE_BAR_HEIGHT {
        return;
    }
    let mut rc = RECT::default();
    unsafe {
        let _ = GetClientRect(hwnd, &mut rc);
    }
    if x > rc.right - BTN_SIZE {
        // Closing the overlay quits the whole tool.
        unsafe { PostQuitMessage(0) };
    } else if x > rc.right - BTN_SIZE * 2 {
        engine.registry.update_by_overlay(overlay, |p| p.collapsed = true);
        sync_and_repaint(hwnd);
    } else if x > rc.right - BTN_SIZE * 3 {
        engine.registry.update_by_overlay(overlay, |p| p.expanded = !p.expanded);
        sync_and_repaint(hwnd);
    }
}

fn on_wheel(hwnd: HWND, wparam: WPARAM) {
    if wparam.0 & MK_CONTROL_BIT == 0 {
        return;
    }
    let Some(engine) = engine::get() else {
        return;
    };
    let overlay = win_util::window_id(hwnd);
    let delta = ((wparam.0 >> 16) & 0xffff) as u16 as i16;
    engine.registry.update_by_overlay(overlay, |p| {
        let size = if delta > 0 {
            p.font_size.saturating_add(FONT_STEP)
        } else {
            p.font_size.saturating_sub(FONT_STEP)
        };
        p.set_font_size(size);
    });
    if let (Some(state), Some(pair)) = (state_of(hwnd), lookup_pair(hwnd)) {
        apply_font(state, pair.font_size);
    }
}

pub unsafe extern "system" fn overlay_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_CREATE => on_create(hwnd),
        WM_SIZE => {
            if let Some(state) = state_of(hwnd) {
                let mut rc = RECT::default();
                let _ = GetClientRect(hwnd, &mut rc);
                if rc.bottom > TITLE_BAR_HEIGHT {
                    let _ = MoveWindow(
                        state.edit,
                        0,
                        TITLE_BAR_HEIGHT,
                        rc.right,
                        rc.bottom - TITLE_BAR_HEIGHT,
                        true,
                    );
                }
            }
            LRESULT(0)
        }
        WM_PAINT => {
            paint(hwnd);
            LRESULT(0)
        }
        WM_LBUTTONDOWN => {
            let x = (lparam.0 & 0xffff) as i16 as i32;
            let y = ((lparam.0 >> 16) & 0xffff) as i16 as i32;
            on_left_click(hwnd, x, y);
            LRESULT(0)
        }
        WM_MOUSEWHEEL => {
            on_wheel(hwnd, wparam);
            LRESULT(0)
        }
        WM_COMMAND => {
            let control = (wparam.0 & 0xffff) as isize;
            let code = ((wparam.0 >> 16) & 0xffff) as u32;
            if control == ID_MEMO_EDIT && code == EN_CHANGE {
                if let Some(state) = state_of(hwnd) {
                    autosave(hwnd, state);
                }
            }
            LRESULT(0)
        }
        WM_APP_PATH_RESOLVED => {
            // The worker wrote the registry before posting, so the pair read
            // here already carries the new path.
            if let Some(pair) = lookup_pair(hwnd) {
                if let Some(engine) = engine::get() {
                    engine.ops.sync_position(&pair);
                }
                if let Some(state) = state_of(hwnd) {
                    reload_memo(state, &pair);
                }
            }
            let _ = InvalidateRect(hwnd, None, true);
            LRESULT(0)
        }
        WM_APP_SAFETY_RECHECK => {
            let kind = EventKind::from_raw(lparam.0 as u8);
            if let (Some(engine), Some(kind)) = (engine::get(), kind) {
                if let Some(pair) = lookup_pair(hwnd) {
                    engine.router.handle_event(kind, pair.browser);
                }
            }
            LRESULT(0)
        }
        WM_CTLCOLOREDIT => LRESULT(GetStockObject(WHITE_BRUSH).0 as isize),
        WM_NCDESTROY => {
            let ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut OverlayState;
            if !ptr.is_null() {
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
                let state = Box::from_raw(ptr);
                let _ = DeleteObject(state.font);
            }
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

