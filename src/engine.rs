use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::cooldown::CooldownGovernor;
use crate::discovery::Discovery;
use crate::ops::{PathSource, WindowOps};
use crate::registry::OverlayRegistry;
use crate::router::EventRouter;
use crate::settings::Settings;

/// The assembled tracking engine: one registry, one cooldown governor, the
/// router and the discovery sweep, all sharing injected window/path backends.
pub struct Engine {
    pub settings: Settings,
    pub registry: Arc<OverlayRegistry>,
    pub cooldown: Arc<CooldownGovernor>,
    pub ops: Arc<dyn WindowOps>,
    pub router: Arc<EventRouter>,
    pub discovery: Discovery,
}

impl Engine {
    pub fn new(
        settings: Settings,
        ops: Arc<dyn WindowOps>,
        paths: Arc<dyn PathSource>,
    ) -> Arc<Self> {
        let registry = Arc::new(OverlayRegistry::new());
        let cooldown = Arc::new(CooldownGovernor::new());
        let router = Arc::new(EventRouter::new(
            Arc::clone(&registry),
            Arc::clone(&cooldown),
            Arc::clone(&ops),
            paths,
            settings.router_config(),
        ));
        let discovery = Discovery::new(
            Arc::clone(&registry),
            Arc::clone(&ops),
            Arc::clone(&router),
        );
        Arc::new(Self {
            settings,
            registry,
            cooldown,
            ops,
            router,
            discovery,
        })
    }
}

// The WinEvent callback, the timer proc and the overlay window procedure are
// plain function pointers with no context argument, so the process keeps one
// installed engine for them to reach. Everything below the FFI boundary takes
// its dependencies explicitly.
static ENGINE: OnceCell<Arc<Engine>> = OnceCell::new();

pub fn install(engine: Arc<Engine>) -> anyhow::Result<()> {
    ENGINE
        .set(engine)
        .map_err(|_| anyhow::anyhow!("engine already installed"))
}

pub fn get() -> Option<&'static Arc<Engine>> {
    ENGINE.get()
}
