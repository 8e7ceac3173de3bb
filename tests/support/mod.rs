#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use folder_memo::cooldown::CooldownGovernor;
use folder_memo::discovery::Discovery;
use folder_memo::events::EventKind;
use folder_memo::ops::{PathSource, WindowOps};
use folder_memo::registry::{OverlayRegistry, TrackedPair, WindowId};
use folder_memo::router::{EventRouter, RouterConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Post {
    PathResolved { overlay: WindowId, note_exists: bool },
    SafetyRecheck { overlay: WindowId, kind: EventKind },
}

#[derive(Debug, Clone)]
pub struct PostRecord {
    pub post: Post,
    pub at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayOp {
    Hide(WindowId),
    Destroy(WindowId),
}

#[derive(Default)]
struct MockState {
    /// Live target-class (browser) windows and their visibility.
    targets: HashMap<WindowId, bool>,
    /// Live windows of some other class.
    foreign: HashSet<WindowId>,
    overlays: HashSet<WindowId>,
    next_overlay: isize,
    overlays_created: u32,
    ops_log: Vec<OverlayOp>,
    posts: Vec<PostRecord>,
    positions: Vec<TrackedPair>,
}

/// In-memory window system. Overlay ids are negative so they can never
/// collide with the browser ids tests pick.
#[derive(Default)]
pub struct MockWindowOps {
    state: Mutex<MockState>,
}

impl MockWindowOps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_target(&self, id: WindowId, visible: bool) {
        self.state.lock().unwrap().targets.insert(id, visible);
    }

    pub fn add_foreign(&self, id: WindowId) {
        self.state.lock().unwrap().foreign.insert(id);
    }

    pub fn set_visible(&self, id: WindowId, visible: bool) {
        self.state.lock().unwrap().targets.insert(id, visible);
    }

    /// Simulate the OS destroying a window out from under us.
    pub fn kill(&self, id: WindowId) {
        let mut state = self.state.lock().unwrap();
        state.targets.remove(&id);
        state.foreign.remove(&id);
    }

    pub fn overlay_alive(&self, id: WindowId) -> bool {
        self.state.lock().unwrap().overlays.contains(&id)
    }

    pub fn overlays_created(&self) -> u32 {
        self.state.lock().unwrap().overlays_created
    }

    pub fn posts(&self) -> Vec<PostRecord> {
        self.state.lock().unwrap().posts.clone()
    }

    pub fn ops_log(&self) -> Vec<OverlayOp> {
        self.state.lock().unwrap().ops_log.clone()
    }

    pub fn positions(&self) -> Vec<TrackedPair> {
        self.state.lock().unwrap().positions.clone()
    }
}

impl WindowOps for MockWindowOps {
    fn is_window(&self, id: WindowId) -> bool {
        let state = self.state.lock().unwrap();
        state.targets.contains_key(&id)
            || state.foreign.contains(&id)
            || state.overlays.contains(&id)
    }

    fn is_target_window(&self, id: WindowId) -> bool {
        self.state.lock().unwrap().targets.contains_key(&id)
    }

    fn is_visible(&self, id: WindowId) -> bool {
        self.state.lock().unwrap().targets.get(&id).copied().unwrap_or(false)
    }

    fn create_overlay(&self, _owner: WindowId) -> Option<WindowId> {
        let mut state = self.state.lock().unwrap();
        state.next_overlay -= 1;
        let id = WindowId(state.next_overlay);
        state.overlays.insert(id);
        state.overlays_created += 1;
        Some(id)
    }

    fn destroy_overlay(&self, id: WindowId) {
        let mut state = self.state.lock().unwrap();
        state.overlays.remove(&id);
        state.ops_log.push(OverlayOp::Destroy(id));
    }

    fn hide_overlay(&self, id: WindowId) {
        self.state.lock().unwrap().ops_log.push(OverlayOp::Hide(id));
    }

    fn sync_position(&self, pair: &TrackedPair) {
        self.state.lock().unwrap().positions.push(pair.clone());
    }

    fn post_path_resolved(&self, overlay: WindowId, note_exists: bool) {
        self.state.lock().unwrap().posts.push(PostRecord {
            post: Post::PathResolved { overlay, note_exists },
            at: Instant::now(),
        });
    }

    fn post_safety_recheck(&self, overlay: WindowId, kind: EventKind) {
        self.state.lock().unwrap().posts.push(PostRecord {
            post: Post::SafetyRecheck { overlay, kind },
            at: Instant::now(),
        });
    }

    fn enumerate_targets(&self) -> Vec<WindowId> {
        self.state.lock().unwrap().targets.keys().copied().collect()
    }
}

/// Path source backed by a map, with an optional per-call delay to stand in
/// for a hung Explorer.
#[derive(Default)]
pub struct MockPathSource {
    paths: Mutex<HashMap<WindowId, PathBuf>>,
    delay: Mutex<Duration>,
    calls: AtomicU32,
}

impl MockPathSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, id: WindowId, path: PathBuf) {
        self.paths.lock().unwrap().insert(id, path);
    }

    pub fn clear(&self, id: WindowId) {
        self.paths.lock().unwrap().remove(&id);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PathSource for MockPathSource {
    fn resolve(&self, browser: WindowId) -> Option<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        self.paths.lock().unwrap().get(&browser).cloned()
    }
}

/// Path source that replays a fixed sequence of answers, for retry tests.
pub struct ScriptedSource {
    answers: Mutex<VecDeque<Option<PathBuf>>>,
    calls: AtomicU32,
}

impl ScriptedSource {
    pub fn new(answers: Vec<Option<PathBuf>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PathSource for ScriptedSource {
    fn resolve(&self, _browser: WindowId) -> Option<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers.lock().unwrap().pop_front().flatten()
    }
}

/// Engine wired to mocks, with timings short enough for tests.
pub struct Harness {
    pub registry: Arc<OverlayRegistry>,
    pub cooldown: Arc<CooldownGovernor>,
    pub ops: Arc<MockWindowOps>,
    pub paths: Arc<MockPathSource>,
    pub router: Arc<EventRouter>,
    pub discovery: Discovery,
}

pub fn test_config() -> RouterConfig {
    RouterConfig {
        cooldown: Duration::from_millis(300),
        resolve_retries: 5,
        resolve_delay: Duration::from_millis(25),
        default_font_size: 16,
    }
}

pub fn harness() -> Harness {
    harness_with(test_config())
}

pub fn harness_with(config: RouterConfig) -> Harness {
    let registry = Arc::new(OverlayRegistry::new());
    let cooldown = Arc::new(CooldownGovernor::new());
    let ops = Arc::new(MockWindowOps::new());
    let paths = Arc::new(MockPathSource::new());
    let router = Arc::new(EventRouter::new(
        Arc::clone(&registry),
        Arc::clone(&cooldown),
        ops.clone() as Arc<dyn WindowOps>,
        paths.clone() as Arc<dyn PathSource>,
        config,
    ));
    let discovery = Discovery::new(
        Arc::clone(&registry),
        ops.clone() as Arc<dyn WindowOps>,
        Arc::clone(&router),
    );
    Harness {
        registry,
        cooldown,
        ops,
        paths,
        router,
        discovery,
    }
}

/// Poll `cond` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}
