use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::Mutex;

use crate::traits::Clock;

#[derive(Clone)]
pub struct MockClock {
    now: Arc<Mutex<Instant>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn increment_now(&self, dur: Duration) {
        *self.now.lock() += dur;
    }

    pub fn now_instant(&self) -> Instant {
        *self.now.lock()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.now_instant()
    }
}
