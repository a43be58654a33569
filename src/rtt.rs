use std::time::Duration;

use crate::{constants::INITIAL_RTT, traits::RttProvider};

#[derive(Debug, Clone, Copy)]
pub struct RttStats {
    latest: Option<Duration>,
    min: Option<Duration>,
    smoothed: Duration,
    deviation: Duration,
    initial: Duration,
}

impl Default for RttStats {
    fn default() -> Self {
        Self::new(INITIAL_RTT)
    }
}

impl RttStats {
    pub fn new(initial: Duration) -> Self {
        Self {
            latest: None,
            min: None,
            smoothed: initial,
            deviation: initial / 2,
            initial,
        }
    }

    pub fn latest_rtt(&self) -> Option<Duration> {
        self.latest
    }

    pub fn smoothed_rtt(&self) -> Duration {
        self.smoothed
    }

    pub fn mean_deviation(&self) -> Duration {
        self.deviation
    }

    pub fn sample(&mut self, rtt: Duration) {
        if rtt.is_zero() {
            tracing::warn!("ignoring zero rtt sample");
            return;
        }

        self.min = Some(self.min.map_or(rtt, |m| m.min(rtt)));

        match self.latest {
            None => {
                // First sample replaces the initial guess entirely.
                self.smoothed = rtt;
                self.deviation = rtt / 2;
            }
            Some(_) => {
                // "Congestion Avoidance and Control", Van Jacobson, Michael J. Karels, 1988
                let diff = if self.smoothed > rtt {
                    self.smoothed - rtt
                } else {
                    rtt - self.smoothed
                };
                self.deviation = (self.deviation * 3 + diff) / 4;
                self.smoothed = (self.smoothed * 7 + rtt) / 8;
            }
        }
        self.latest = Some(rtt);

        tracing::event!(
            crate::constants::RTT_TRACING_LOG_LEVEL,
            sample = ?rtt,
            min = ?self.min,
            smoothed = ?self.smoothed,
            deviation = ?self.deviation,
            "rtt sample"
        );
    }

    /// A new path has unrelated round trip times.
    pub fn on_connection_migration(&mut self) {
        *self = Self::new(self.initial);
    }
}

impl RttProvider for RttStats {
    fn min_rtt(&self) -> Duration {
        self.min.unwrap_or(self.initial)
    }
}
