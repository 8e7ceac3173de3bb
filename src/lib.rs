pub mod cooldown;
pub mod discovery;
pub mod engine;
pub mod events;
pub mod logging;
pub mod notes;
pub mod ops;
pub mod placement;
pub mod registry;
pub mod router;
pub mod settings;
pub mod worker;

#[cfg(target_os = "windows")]
pub mod hooks;
#[cfg(target_os = "windows")]
pub mod overlay;
#[cfg(target_os = "windows")]
pub mod probe;
#[cfg(target_os = "windows")]
pub mod resolver;
#[cfg(target_os = "windows")]
pub mod win_ops;
#[cfg(target_os = "windows")]
pub mod win_util;
