use std::time::Duration;

use crate::{constants::CONGESTION_TRACING_LOG_LEVEL, traits::GrowthCalculator};

/// Cheap copy of a calculator's internal state, compared before and after
/// each call to decide whether to log.
pub trait Snapshot {
    type State: PartialEq + Copy + core::fmt::Debug + 'static;

    fn snapshot(&self) -> Self::State;
}

#[derive(Debug)]
pub struct TracingCalculator<I> {
    inner: I,
}

impl<I> TracingCalculator<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I> GrowthCalculator for TracingCalculator<I>
where
    I: GrowthCalculator + Snapshot,
{
    fn after_ack(&mut self, window_packets: u64, min_rtt: Duration) -> u64 {
        log_every_ms_if_changed!(
            500,
            CONGESTION_TRACING_LOG_LEVEL,
            "after_ack",
            self,
            |s| s.inner.snapshot(),
            |s| s.inner.after_ack(window_packets, min_rtt)
        )
    }

    fn after_loss(&mut self, window_packets: u64) -> u64 {
        log_if_changed!(
            CONGESTION_TRACING_LOG_LEVEL,
            "after_loss",
            self,
            |s| s.inner.snapshot(),
            |s| s.inner.after_loss(window_packets)
        )
    }

    fn reset(&mut self) {
        log_if_changed!(
            CONGESTION_TRACING_LOG_LEVEL,
            "reset",
            self,
            |s| s.inner.snapshot(),
            |s| s.inner.reset()
        )
    }

    fn on_application_limited(&mut self) {
        log_every_ms_if_changed!(
            500,
            CONGESTION_TRACING_LOG_LEVEL,
            "on_application_limited",
            self,
            |s| s.inner.snapshot(),
            |s| s.inner.on_application_limited()
        )
    }

    fn set_num_connections(&mut self, num_connections: u32) {
        self.inner.set_num_connections(num_connections);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{
        congestion::cubic::Cubic,
        test_util::{MockClock, setup_test_logging},
        traits::GrowthCalculator,
    };

    use super::{Snapshot, TracingCalculator};

    #[test]
    fn test_tracing_is_transparent() {
        setup_test_logging();
        let clock = MockClock::new();
        let mut plain = Cubic::new(clock.clone());
        let mut traced = TracingCalculator::new(Cubic::new(clock.clone()));

        for window in [10, 10, 11, 12] {
            clock.increment_now(Duration::from_millis(40));
            assert_eq!(
                plain.after_ack(window, Duration::from_millis(50)),
                traced.after_ack(window, Duration::from_millis(50))
            );
        }
        assert_eq!(plain.after_loss(40), traced.after_loss(40));
        traced.reset();
        plain.reset();
        assert_eq!(plain.snapshot(), traced.into_inner().snapshot());
    }
}
