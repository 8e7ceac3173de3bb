use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Process-wide suppression window armed after every destroy-class window
/// event. Explorer's own teardown sequence races anything that touches the
/// dying handles, so while the deadline has not passed, location/name/focus
/// work is deferred instead of executed.
#[derive(Default)]
pub struct CooldownGovernor {
    deadline: Mutex<Option<Instant>>,
}

impl CooldownGovernor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the suppression deadline to `now + duration`. An already later
    /// deadline is kept.
    pub fn arm(&self, duration: Duration) {
        let until = Instant::now() + duration;
        let mut deadline = self.deadline.lock().unwrap();
        match *deadline {
            Some(existing) if existing >= until => {}
            _ => *deadline = Some(until),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.remaining().is_some()
    }

    /// Time left until the deadline passes, or `None` when disarmed.
    pub fn remaining(&self) -> Option<Duration> {
        let deadline = self.deadline.lock().unwrap();
        deadline.and_then(|d| d.checked_duration_since(Instant::now()))
    }
}
