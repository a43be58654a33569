use std::time::{Duration, Instant};

use crate::{
    constants::DEFAULT_NUM_CONNECTIONS,
    traits::{Clock, GrowthCalculator},
    utils::mul_ratio,
};

use super::tracing::Snapshot;

// Constants for the packet-counted CUBIC growth function. Time is measured in
// 1/1024 second units so that dividing by a second is a shift.
const CUBE_SCALE: u32 = 40; // 1024*1024^3 (first 1024 is from 0.100^3)
const CUBE_CONGESTION_WINDOW_SCALE: i128 = 410;
const CUBE_FACTOR: u64 = (1u64 << CUBE_SCALE) / CUBE_CONGESTION_WINDOW_SCALE as u64;

// Window updates are limited by elapsed time, not by the number of acks.
const MAX_CUBIC_TIME_INTERVAL: Duration = Duration::from_millis(30);

// Beta of a single flow (0.7), and the extra back-off applied to the
// remembered max when a loss happens before it was reached again (0.85).
const BETA_CUBIC: f64 = 0.7;
const BETA_NUM: u64 = 7;
const BETA_DEN: u64 = 10;
const BETA_LAST_MAX_NUM: u64 = 17;
const BETA_LAST_MAX_DEN: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CubicState {
    num_connections: u32,

    // Start of the current growth epoch. None until the first ack after a
    // loss, reset or application-limited period.
    epoch: Option<Instant>,
    last_update_time: Option<Instant>,

    last_congestion_window: u64,
    // Window at the last loss, possibly backed off by fast convergence.
    last_max_congestion_window: u64,

    // Reno-friendly estimate of what a TCP flow would have by now.
    acked_packets_count: u64,
    estimated_tcp_congestion_window: u64,

    origin_point_congestion_window: u64,
    // In 1/1024 second units.
    time_to_origin_point: i64,
    last_target_congestion_window: u64,
}

impl CubicState {
    fn new(num_connections: u32) -> Self {
        Self {
            num_connections,
            epoch: None,
            last_update_time: None,
            last_congestion_window: 0,
            last_max_congestion_window: 0,
            acked_packets_count: 0,
            estimated_tcp_congestion_window: 0,
            origin_point_congestion_window: 0,
            time_to_origin_point: 0,
            last_target_congestion_window: 0,
        }
    }
}

pub struct Cubic<C> {
    state: CubicState,
    clock: C,
}

impl<C> core::fmt::Debug for Cubic<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "n={},w_max={},origin={},est={},target={}",
            self.state.num_connections,
            self.state.last_max_congestion_window,
            self.state.origin_point_congestion_window,
            self.state.estimated_tcp_congestion_window,
            self.state.last_target_congestion_window
        )
    }
}

impl<C: Clock> Cubic<C> {
    pub fn new(clock: C) -> Self {
        Self {
            state: CubicState::new(DEFAULT_NUM_CONNECTIONS),
            clock,
        }
    }

    fn n(&self) -> u64 {
        self.state.num_connections.max(1) as u64
    }

    // Additive increase factor of the Reno-friendly estimate for the emulated
    // flows.
    fn alpha(&self) -> f64 {
        alpha(self.state.num_connections)
    }
}

fn beta(num_connections: u32) -> f64 {
    let n = num_connections.max(1) as f64;
    (n - 1. + BETA_CUBIC) / n
}

// TCP-friendly alpha for a given beta, emulating n flows:
// 3 * n^2 * (1 - beta) / (1 + beta).
fn alpha(num_connections: u32) -> f64 {
    let n = num_connections.max(1) as f64;
    let b = beta(num_connections);
    3. * n * n * (1. - b) / (1. + b)
}

impl<C: Clock> GrowthCalculator for Cubic<C> {
    fn after_ack(&mut self, current: u64, min_rtt: Duration) -> u64 {
        let alpha = self.alpha();
        let now = self.clock.now();
        let s = &mut self.state;
        s.acked_packets_count += 1;

        if s.last_congestion_window == current
            && s.last_update_time
                .is_some_and(|t| now.saturating_duration_since(t) <= MAX_CUBIC_TIME_INTERVAL)
        {
            return s
                .last_target_congestion_window
                .max(s.estimated_tcp_congestion_window);
        }
        s.last_congestion_window = current;
        s.last_update_time = Some(now);

        let epoch = match s.epoch {
            Some(epoch) => epoch,
            None => {
                s.epoch = Some(now);
                s.acked_packets_count = 1;
                s.estimated_tcp_congestion_window = current;
                if s.last_max_congestion_window <= current {
                    s.time_to_origin_point = 0;
                    s.origin_point_congestion_window = current;
                } else {
                    let distance = (s.last_max_congestion_window - current) as f64;
                    s.time_to_origin_point = (CUBE_FACTOR as f64 * distance).cbrt() as i64;
                    s.origin_point_congestion_window = s.last_max_congestion_window;
                }
                now
            }
        };

        // Take the round trip time into account, so the target is where the
        // window should be once this ack's successors arrive.
        let elapsed = now.saturating_duration_since(epoch) + min_rtt;
        let elapsed_time = ((elapsed.as_micros() << 10) / 1_000_000) as i128;

        let offset = s.time_to_origin_point as i128 - elapsed_time;
        let delta = (CUBE_CONGESTION_WINDOW_SCALE * offset * offset * offset) >> CUBE_SCALE;
        let target = (s.origin_point_congestion_window as i128 - delta).clamp(0, u64::MAX as i128)
            as u64;

        loop {
            // Number of acks a Reno flow needs to grow the estimated window by one.
            let required_ack_count = ((s.estimated_tcp_congestion_window as f64 / alpha) as u64).max(1);
            if s.acked_packets_count < required_ack_count {
                break;
            }
            s.acked_packets_count -= required_ack_count;
            s.estimated_tcp_congestion_window += 1;
        }

        s.last_target_congestion_window = target;
        target.max(s.estimated_tcp_congestion_window).max(1)
    }

    fn after_loss(&mut self, current: u64) -> u64 {
        let n = self.n();
        let s = &mut self.state;
        if current < s.last_max_congestion_window {
            // We never reached the old max, so assume we are competing with
            // another flow. Back off further to let the other flow grow.
            s.last_max_congestion_window = mul_ratio(
                current,
                BETA_LAST_MAX_DEN * (n - 1) + BETA_LAST_MAX_NUM,
                BETA_LAST_MAX_DEN * n,
            );
        } else {
            s.last_max_congestion_window = current;
        }
        s.epoch = None;
        mul_ratio(current, BETA_DEN * (n - 1) + BETA_NUM, BETA_DEN * n)
    }

    fn reset(&mut self) {
        self.state = CubicState::new(self.state.num_connections);
    }

    fn on_application_limited(&mut self) {
        // Don't keep growing the origin-relative target while the window isn't
        // used. The next ack starts a fresh epoch.
        self.state.epoch = None;
    }

    fn set_num_connections(&mut self, num_connections: u32) {
        self.state.num_connections = num_connections.max(1);
    }
}

impl<C> Snapshot for Cubic<C> {
    type State = CubicState;

    fn snapshot(&self) -> CubicState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use approx::assert_abs_diff_eq;

    use crate::{
        test_util::{MockClock, setup_test_logging},
        traits::GrowthCalculator,
    };

    use super::{Cubic, alpha, beta};

    const HUNDRED_MS: Duration = Duration::from_millis(100);
    const ONE_MS: Duration = Duration::from_millis(1);

    fn make_cubic() -> (Cubic<MockClock>, MockClock) {
        let clock = MockClock::new();
        (Cubic::new(clock.clone()), clock)
    }

    #[test]
    fn test_alpha_beta() {
        assert_abs_diff_eq!(beta(1), 0.7, epsilon = 1e-9);
        assert_abs_diff_eq!(beta(2), 0.85, epsilon = 1e-9);
        assert_abs_diff_eq!(alpha(1), 0.9 / 1.7, epsilon = 1e-9);
        assert_abs_diff_eq!(alpha(2), 1.8 / 1.85, epsilon = 1e-9);
        assert_abs_diff_eq!(beta(0), beta(1), epsilon = 1e-9);
    }

    #[test]
    fn test_first_ack_grows_by_one() {
        let (mut cubic, clock) = make_cubic();
        clock.increment_now(ONE_MS);
        assert_eq!(cubic.after_ack(10, HUNDRED_MS), 11);
    }

    #[test]
    fn test_updates_limited_by_time() {
        let (mut cubic, clock) = make_cubic();
        clock.increment_now(ONE_MS);
        assert_eq!(cubic.after_ack(10, HUNDRED_MS), 11);
        // Same window, no time elapsed: cached target.
        assert_eq!(cubic.after_ack(10, HUNDRED_MS), 11);
        assert_eq!(cubic.after_ack(11, HUNDRED_MS), 11);
    }

    #[test]
    fn test_growth_over_time() {
        setup_test_logging();
        let (mut cubic, clock) = make_cubic();
        let mut window = 10;
        for _ in 0..10 {
            for _ in 0..window {
                let next = cubic.after_ack(window, HUNDRED_MS);
                assert!(next >= window, "{next} < {window}");
                window = next;
            }
            clock.increment_now(HUNDRED_MS);
            tracing::trace!(?cubic, window, "round done");
        }
        assert!(window > 15, "window={window}");
    }

    #[test]
    fn test_after_loss_fast_convergence() {
        let (mut cubic, _clock) = make_cubic();
        assert_eq!(cubic.after_loss(100), 85);
        assert_eq!(cubic.state.last_max_congestion_window, 100);

        assert_eq!(cubic.after_loss(80), 68);
        assert_eq!(cubic.state.last_max_congestion_window, 74);
        assert_eq!(cubic.state.epoch, None);
    }

    #[test]
    fn test_after_loss_single_connection() {
        let (mut cubic, _clock) = make_cubic();
        cubic.set_num_connections(1);
        assert_eq!(cubic.after_loss(100), 70);
    }

    #[test]
    fn test_reset_forgets_last_max() {
        let (mut cubic, clock) = make_cubic();
        cubic.after_loss(100);
        clock.increment_now(ONE_MS);
        let without_reset = cubic.after_ack(50, HUNDRED_MS);
        assert!(without_reset > 51, "{without_reset}");

        cubic.reset();
        clock.increment_now(ONE_MS);
        assert_eq!(cubic.after_ack(50, HUNDRED_MS), 51);
        assert_eq!(cubic.state.num_connections, 2);
    }

    #[test]
    fn test_application_limited_restarts_epoch() {
        let (mut cubic, clock) = make_cubic();
        clock.increment_now(ONE_MS);
        cubic.after_ack(10, HUNDRED_MS);
        assert!(cubic.state.epoch.is_some());

        cubic.on_application_limited();
        assert_eq!(cubic.state.epoch, None);

        clock.increment_now(Duration::from_secs(1));
        assert_eq!(cubic.after_ack(20, HUNDRED_MS), 21);
        assert_eq!(cubic.state.epoch, Some(clock.now_instant()));
    }
}
