mod support;

use std::path::PathBuf;
use std::time::Duration;

use folder_memo::events::EventKind;
use folder_memo::registry::WindowId;

use support::{harness, wait_until, Post};

const BROWSER: WindowId = WindowId(0x1000);

#[test]
fn created_event_tracks_a_browser_window() {
    let h = harness();
    h.ops.add_target(BROWSER, true);
    h.paths.set(BROWSER, PathBuf::from("/tmp/folder-f"));

    h.router.handle_event(EventKind::Created, BROWSER);

    assert_eq!(h.registry.len(), 1);
    let pair = h.registry.get(BROWSER).unwrap();
    assert!(h.ops.overlay_alive(pair.overlay));
    // The overlay is placed immediately, before the path is known.
    assert_eq!(h.ops.positions().len(), 1);

    assert!(wait_until(Duration::from_secs(2), || {
        h.registry.get(BROWSER).unwrap().resolved_path.is_some()
    }));
    let pair = h.registry.get(BROWSER).unwrap();
    assert_eq!(pair.resolved_path.as_deref(), Some(std::path::Path::new("/tmp/folder-f")));
}

#[test]
fn duplicate_notifications_keep_one_pair_per_browser() {
    let h = harness();
    h.ops.add_target(BROWSER, true);

    h.router.handle_event(EventKind::Created, BROWSER);
    h.router.handle_event(EventKind::Shown, BROWSER);
    h.router.handle_event(EventKind::Created, BROWSER);
    // The sweep's creation path must be idempotent with the router's.
    h.discovery.sweep();
    h.discovery.sweep();

    assert_eq!(h.registry.len(), 1);
    assert_eq!(h.ops.overlays_created(), 1);
}

#[test]
fn non_target_windows_are_ignored() {
    let h = harness();
    h.ops.add_foreign(WindowId(0x2000));

    h.router.handle_event(EventKind::Created, WindowId(0x2000));
    // A handle that never belonged to a live window.
    h.router.handle_event(EventKind::Created, WindowId(0x3000));

    assert!(h.registry.is_empty());
    assert_eq!(h.ops.overlays_created(), 0);
}

#[test]
fn name_change_re_resolves_and_posts_after_the_registry_write() {
    let h = harness();
    h.ops.add_target(BROWSER, true);
    h.paths.set(BROWSER, PathBuf::from("/tmp/folder-f"));
    h.router.handle_event(EventKind::Created, BROWSER);
    assert!(wait_until(Duration::from_secs(2), || {
        h.registry.get(BROWSER).unwrap().resolved_path.is_some()
    }));

    // Navigation: the browser now shows folder G.
    h.paths.set(BROWSER, PathBuf::from("/tmp/folder-g"));
    h.router.handle_event(EventKind::NameChanged, BROWSER);

    assert!(wait_until(Duration::from_secs(2), || {
        h.registry.get(BROWSER).unwrap().resolved_path.as_deref()
            == Some(std::path::Path::new("/tmp/folder-g"))
    }));

    let overlay = h.registry.get(BROWSER).unwrap().overlay;
    let posts = h.ops.posts();
    assert!(posts.iter().any(|p| matches!(
        p.post,
        Post::PathResolved { overlay: o, note_exists: false } if o == overlay
    )));
}

#[test]
fn name_change_for_a_hidden_browser_is_skipped() {
    let h = harness();
    h.ops.add_target(BROWSER, false);
    h.router.adopt(BROWSER);
    // Let the adoption-time worker exhaust its retry budget first.
    assert!(wait_until(Duration::from_secs(2), || h.paths.calls() >= 5));
    let baseline = h.paths.calls();

    h.router.handle_event(EventKind::NameChanged, BROWSER);
    std::thread::sleep(Duration::from_millis(150));
    assert_eq!(h.paths.calls(), baseline, "no resolution for an invisible browser");
}

#[test]
fn location_change_repositions_without_resolving() {
    let h = harness();
    h.ops.add_target(BROWSER, true);
    h.router.adopt(BROWSER);
    // Let the adoption-time worker exhaust its retry budget first.
    assert!(wait_until(Duration::from_secs(2), || h.paths.calls() >= 5));
    let baseline_calls = h.paths.calls();
    let baseline_positions = h.ops.positions().len();

    h.router.handle_event(EventKind::LocationChanged, BROWSER);
    h.router.handle_event(EventKind::ForegroundChanged, BROWSER);

    assert_eq!(h.ops.positions().len(), baseline_positions + 2);
    std::thread::sleep(Duration::from_millis(80));
    assert_eq!(h.paths.calls(), baseline_calls);
}

#[test]
fn resolution_is_idempotent_without_navigation() {
    use folder_memo::ops::PathSource;

    let h = harness();
    h.ops.add_target(BROWSER, true);
    h.paths.set(BROWSER, PathBuf::from("/tmp/stable"));

    let first = h.paths.resolve(BROWSER);
    let second = h.paths.resolve(BROWSER);
    assert_eq!(first, second);
    assert_eq!(first, Some(PathBuf::from("/tmp/stable")));
}
