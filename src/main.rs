#[cfg(target_os = "windows")]
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    run()
}

/// Settings live next to the working directory when present, otherwise under
/// the per-user config directory.
#[cfg(target_os = "windows")]
fn settings_path() -> PathBuf {
    let local = PathBuf::from("settings.json");
    if local.exists() {
        return local;
    }
    dirs_next::config_dir()
        .map(|dir| dir.join("folder_memo").join("settings.json"))
        .unwrap_or(local)
}

#[cfg(target_os = "windows")]
fn log_dir() -> PathBuf {
    dirs_next::data_local_dir()
        .map(|dir| dir.join("folder_memo").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

#[cfg(target_os = "windows")]
fn run() -> anyhow::Result<()> {
    use std::sync::Arc;

    use windows::Win32::Foundation::HWND;
    use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_MULTITHREADED};
    use windows::Win32::UI::HiDpi::{SetProcessDpiAwareness, PROCESS_PER_MONITOR_DPI_AWARE};
    use windows::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, GetMessageW, SetTimer, TranslateMessage, MSG,
    };

    use folder_memo::engine::{self, Engine};
    use folder_memo::resolver::ShellPathSource;
    use folder_memo::settings::Settings;
    use folder_memo::win_ops::Win32WindowOps;
    use folder_memo::{hooks, logging, overlay};

    let settings = Settings::load(&settings_path())?;
    logging::init(settings.debug_logging, &log_dir());
    tracing::info!(?settings, "starting folder memo overlay");

    unsafe {
        let _ = SetProcessDpiAwareness(PROCESS_PER_MONITOR_DPI_AWARE);
        let _ = CoInitializeEx(None, COINIT_MULTITHREADED);
    }

    overlay::register_class()?;

    let ops = Arc::new(Win32WindowOps::new(settings.geometry()));
    let paths = Arc::new(ShellPathSource::new(settings.probe_timeout()));
    let engine = Engine::new(settings.clone(), ops, paths);
    engine::install(Arc::clone(&engine))?;

    let hooks = hooks::install()?;

    // Adopt the Explorer windows that were open before we started, then keep
    // sweeping as a backstop for coalesced or dropped events.
    engine.discovery.sweep();
    unsafe extern "system" fn sweep_timer_proc(_hwnd: HWND, _msg: u32, _id: usize, _time: u32) {
        if let Some(engine) = engine::get() {
            engine.discovery.sweep();
        }
    }
    let timer = unsafe {
        SetTimer(
            None,
            1,
            settings.sweep_interval().as_millis() as u32,
            Some(sweep_timer_proc),
        )
    };
    if timer == 0 {
        tracing::warn!("sweep timer not available, running event-driven only");
    }

    let mut msg = MSG::default();
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).into() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    hooks.uninstall();
    unsafe { CoUninitialize() };
    tracing::info!("shut down");
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn run() -> anyhow::Result<()> {
    anyhow::bail!("folder_memo tracks File Explorer windows and only runs on Windows")
}
