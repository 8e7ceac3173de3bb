use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::placement::OverlayGeometry;
use crate::registry;
use crate::router::RouterConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Normal overlay panel size in pixels.
    #[serde(default = "default_panel_size")]
    pub panel_size: (i32, i32),
    /// Enlarged panel size used while a pair is expanded.
    #[serde(default = "default_expanded_size")]
    pub expanded_size: (i32, i32),
    /// Square badge size shown while collapsed or without a memo file.
    #[serde(default = "default_badge_size")]
    pub badge_size: i32,
    /// Inset from the owner window's bottom-right corner.
    #[serde(default = "default_margin")]
    pub margin: i32,
    /// Suppression window after a destroy event, in milliseconds.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// Interval of the discovery/reaper sweep, in milliseconds.
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
    /// Path resolution attempts per request.
    #[serde(default = "default_resolve_retries")]
    pub resolve_retries: u32,
    /// Delay between resolution attempts, in milliseconds.
    #[serde(default = "default_resolve_delay_ms")]
    pub resolve_delay_ms: u64,
    /// How long the responsiveness probe waits for the browser's message
    /// loop, in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u32,
    /// Initial memo font size for new pairs. Clamped to [8, 72].
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// When enabled the logger is initialised at debug level.
    #[serde(default)]
    pub debug_logging: bool,
}

fn default_panel_size() -> (i32, i32) {
    (400, 600)
}
fn default_expanded_size() -> (i32, i32) {
    (560, 800)
}
fn default_badge_size() -> i32 {
    40
}
fn default_margin() -> i32 {
    25
}
fn default_cooldown_ms() -> u64 {
    500
}
fn default_sweep_interval_ms() -> u64 {
    500
}
fn default_resolve_retries() -> u32 {
    5
}
fn default_resolve_delay_ms() -> u64 {
    300
}
fn default_probe_timeout_ms() -> u32 {
    50
}
fn default_font_size() -> u32 {
    16
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            panel_size: default_panel_size(),
            expanded_size: default_expanded_size(),
            badge_size: default_badge_size(),
            margin: default_margin(),
            cooldown_ms: default_cooldown_ms(),
            sweep_interval_ms: default_sweep_interval_ms(),
            resolve_retries: default_resolve_retries(),
            resolve_delay_ms: default_resolve_delay_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            font_size: default_font_size(),
            debug_logging: false,
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults and
    /// writes them back so the user has something to edit.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let settings = Settings::default();
            let _ = settings.save(path);
            return Ok(settings);
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let settings: Settings =
            serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data).with_context(|| format!("writing {}", path.display()))
    }

    pub fn geometry(&self) -> OverlayGeometry {
        OverlayGeometry {
            panel: self.panel_size,
            expanded: self.expanded_size,
            badge: self.badge_size,
            margin: self.margin,
        }
    }

    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            cooldown: Duration::from_millis(self.cooldown_ms),
            resolve_retries: self.resolve_retries,
            resolve_delay: Duration::from_millis(self.resolve_delay_ms),
            default_font_size: registry::clamp_font_size(self.font_size),
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.probe_timeout_ms))
    }
}
