use std::time::Duration;

use tracing::{debug, error, trace};

use crate::{
    bandwidth::Bandwidth,
    config::ValidatedSenderOpts,
    congestion::{CongestionControlType, Growth},
    constants::{
        MAX_BURST_PACKETS, MAX_CONGESTION_WINDOW_FOR_BANDWIDTH_RESUMPTION,
        MIN_CONGESTION_WINDOW_FOR_BANDWIDTH_RESUMPTION,
    },
    metrics::METRICS,
    packet_number::PacketNumber,
    stats::ConnectionStats,
    traits::{ConnectionState, RecoveryPacer},
};


/// Window state of one sender. All windows are in packets of `mss` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CongestionState {
    window: u64,
    ssthresh: u64,
    min_window: u64,
    max_window: u64,

    // Restored on connection migration.
    initial_window: u64,
    initial_max_window: u64,

    mss: u64,
    num_connections: u32,

    // Losses of packets at or below this belong to the episode that caused the
    // last cutback.
    largest_sent_at_last_cutback: Option<PacketNumber>,
    last_cutback_exited_slow_start: bool,

    slow_start_large_reduction: bool,
    byte_conservation: bool,
}

impl CongestionState {
    fn new(opts: &ValidatedSenderOpts) -> Self {
        Self {
            window: opts.initial_window_packets,
            ssthresh: opts.max_window_packets,
            min_window: opts.min_window_packets,
            max_window: opts.max_window_packets,
            initial_window: opts.initial_window_packets,
            initial_max_window: opts.max_window_packets,
            mss: opts.max_segment_size,
            num_connections: opts.num_emulated_connections,
            largest_sent_at_last_cutback: None,
            last_cutback_exited_slow_start: false,
            slow_start_large_reduction: opts.slow_start_large_reduction,
            byte_conservation: opts.byte_conservation,
        }
    }

    fn in_slow_start(&self) -> bool {
        self.window < self.ssthresh
    }

    // Keep the window within [min_window, max_window].
    fn normalize(&mut self) {
        self.window = self.window.clamp(self.min_window, self.max_window);
    }
}

/// What the connection sees of the window when deciding if it's in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSnapshot {
    pub window_packets: u64,
    pub segment_size: u64,
    pub in_slow_start: bool,
}

impl WindowSnapshot {
    pub fn window_bytes(&self) -> u64 {
        self.window_packets.saturating_mul(self.segment_size)
    }

    /// The window is in use if it's full, if more than half is used in slow
    /// start, or if what's left is no more than a burst.
    pub fn is_cwnd_limited(&self, bytes_in_flight: u64) -> bool {
        let cwnd = self.window_bytes();
        if bytes_in_flight >= cwnd {
            return true;
        }
        let available = cwnd - bytes_in_flight;
        let slow_start_limited = self.in_slow_start && bytes_in_flight > cwnd / 2;
        slow_start_limited || available <= MAX_BURST_PACKETS * self.segment_size
    }
}

/// Loss-based congestion window controller with Reno or CUBIC growth.
///
/// Called once per acked packet and once per lost packet. Counts the window in
/// packets and reports it in bytes.
#[derive(Debug)]
pub struct CubicSender<P> {
    state: CongestionState,
    growth: Growth,
    pacer: P,
    stats: ConnectionStats,
}

impl<P: RecoveryPacer> CubicSender<P> {
    pub fn new(opts: &ValidatedSenderOpts, mut growth: Growth, pacer: P) -> Self {
        growth.set_num_connections(opts.num_emulated_connections);
        Self {
            state: CongestionState::new(opts),
            growth,
            pacer,
            stats: ConnectionStats::default(),
        }
    }

    // Every packet is acked individually, so unlike TCP there's no need to
    // count how many segments one ack covers.
    pub fn on_packet_acked(
        &mut self,
        acked_packet_number: PacketNumber,
        bytes_in_flight: u64,
        conn: &impl ConnectionState,
    ) {
        if conn.in_recovery() {
            error!(
                ?acked_packet_number,
                window = self.state.window,
                "bug: never increase the congestion window during recovery"
            );
            METRICS.bug_growth_in_recovery.increment(1);
            return;
        }

        // Don't grow unless the sender is close to using the current window.
        if !conn.is_cwnd_limited(bytes_in_flight, &self.window_snapshot()) {
            METRICS.application_limited_acks.increment(1);
            self.growth.on_application_limited();
            return;
        }

        if self.state.window >= self.state.max_window {
            return;
        }

        if self.state.in_slow_start() {
            // Exponential growth: one packet per acked packet.
            self.state.window += 1;
            trace!(
                window = self.state.window,
                ssthresh = self.state.ssthresh,
                "slow start"
            );
            return;
        }

        let window = self.growth.after_ack(
            self.state.window,
            self.state.num_connections,
            || conn.min_rtt(),
        );
        self.state.window = window.clamp(self.state.min_window, self.state.max_window);
        trace!(
            kind = ?self.growth.kind(),
            window = self.state.window,
            ssthresh = self.state.ssthresh,
            reno_ack_count = ?self.growth.reno_ack_count(),
            "congestion avoidance"
        );
    }

    pub fn on_packet_lost(
        &mut self,
        lost_packet_number: PacketNumber,
        lost_bytes: u64,
        bytes_in_flight: u64,
        conn: &impl ConnectionState,
    ) {
        // TCP NewReno (RFC 6582): losses of packets sent before the last
        // cutback are the same loss event and are expected.
        if Some(lost_packet_number) <= self.state.largest_sent_at_last_cutback {
            self.on_loss_in_last_episode(lost_packet_number, lost_bytes);
            return;
        }

        let in_slow_start = self.state.in_slow_start();
        self.stats.loss_events += 1;
        METRICS.loss_events.increment(1);
        self.state.last_cutback_exited_slow_start = in_slow_start;
        if in_slow_start {
            self.stats.slowstart_packets_lost += 1;
            METRICS.slow_start_packets_lost.increment(1);
        }

        self.pacer.on_packet_lost(bytes_in_flight);

        let window = self.state.window;
        let new_window = if self.state.slow_start_large_reduction && in_slow_start {
            if window <= 1 {
                error!(window, "bug: slow start reduction with window <= 1");
                METRICS.bug_slow_start_reduction_at_min.increment(1);
                window
            } else {
                window - 1
            }
        } else {
            self.growth.after_loss(window, self.state.num_connections)
        };

        self.state.window = new_window;
        self.state.normalize();
        self.state.ssthresh = self.state.window;
        // A lost packet was sent, so the watermark covers it even if the
        // tracker lags behind.
        self.state.largest_sent_at_last_cutback =
            conn.largest_sent_packet().max(Some(lost_packet_number));
        // Congestion avoidance counting restarts after the loss.
        self.growth.on_loss_epoch();

        debug!(
            ?lost_packet_number,
            lost_bytes,
            in_slow_start,
            prev_window = window,
            window = self.state.window,
            ssthresh = self.state.ssthresh,
            largest_sent_at_last_cutback = ?self.state.largest_sent_at_last_cutback,
            "loss event, window cut back"
        );
    }

    fn on_loss_in_last_episode(&mut self, lost_packet_number: PacketNumber, lost_bytes: u64) {
        METRICS.duplicate_loss_notifications.increment(1);

        if self.state.last_cutback_exited_slow_start {
            self.stats.slowstart_packets_lost += 1;
            self.stats.slowstart_bytes_lost += lost_bytes;
            METRICS.slow_start_packets_lost.increment(1);

            if self.state.slow_start_large_reduction {
                let reduce = if self.state.byte_conservation {
                    // One packet of reduction for every mss of bytes lost.
                    let mss = self.state.mss;
                    let lost_total = self.stats.slowstart_bytes_lost;
                    self.stats.slowstart_packets_lost == 1
                        || lost_total / mss > (lost_total - lost_bytes) / mss
                } else {
                    // One packet of reduction for every loss.
                    true
                };
                if reduce {
                    self.state.window = self
                        .state
                        .window
                        .saturating_sub(1)
                        .max(self.state.min_window);
                }
                self.state.ssthresh = self.state.window;
            }
        }

        trace!(
            ?lost_packet_number,
            largest_sent_at_last_cutback = ?self.state.largest_sent_at_last_cutback,
            window = self.state.window,
            "ignoring loss sent prior to the last window cutback"
        );
    }

    pub fn on_retransmission_timeout(&mut self) {
        METRICS.retransmission_timeouts.increment(1);
        self.growth.reset();
        self.state.ssthresh = self.state.window / 2;
        self.state.window = self.state.min_window;
        debug!(
            window = self.state.window,
            ssthresh = self.state.ssthresh,
            "retransmission timeout"
        );
    }

    /// Start over on a new network path.
    pub fn on_connection_migration(&mut self) {
        METRICS.connection_migrations.increment(1);
        self.growth.reset();
        self.pacer.on_connection_migration();

        let s = &mut self.state;
        s.largest_sent_at_last_cutback = None;
        s.last_cutback_exited_slow_start = false;
        s.window = s.initial_window;
        s.ssthresh = s.initial_max_window;
        s.max_window = s.initial_max_window;
        s.min_window = s.min_window.min(s.max_window);
        s.normalize();

        debug!(window = s.window, max_window = s.max_window, "connection migration");
    }

    /// End slow start without a loss, e.g. on an explicit congestion signal.
    pub fn exit_slow_start(&mut self) {
        self.state.ssthresh = self.state.window;
    }

    /// Seed the window from cached network parameters when resuming a
    /// connection. Only meaningful before any ack or loss.
    pub fn set_window_from_bandwidth_and_rtt(&mut self, bandwidth: Bandwidth, rtt: Duration) {
        let bdp_packets = bandwidth.to_bytes_per_period(rtt) / self.state.mss;
        // Bad cached data must not produce an absurd window.
        self.state.window = bdp_packets.clamp(
            MIN_CONGESTION_WINDOW_FOR_BANDWIDTH_RESUMPTION,
            MAX_CONGESTION_WINDOW_FOR_BANDWIDTH_RESUMPTION,
        );
        self.state.normalize();
        debug!(
            ?bandwidth,
            ?rtt,
            bdp_packets,
            window = self.state.window,
            "window seeded from bandwidth estimate"
        );
    }

    pub fn set_window_packets(&mut self, window_packets: u64) {
        self.state.window = window_packets;
        self.state.normalize();
    }

    pub fn set_min_window_packets(&mut self, min_window_packets: u64) {
        self.state.min_window = min_window_packets.clamp(1, self.state.max_window);
        self.state.normalize();
    }

    pub fn set_max_window_bytes(&mut self, max_window_bytes: u64) {
        self.state.max_window = (max_window_bytes / self.state.mss).max(self.state.min_window);
        self.state.normalize();
    }

    pub fn set_num_emulated_connections(&mut self, num_connections: u32) {
        let n = num_connections.max(1);
        self.state.num_connections = n;
        self.growth.set_num_connections(n);
    }

    pub fn is_cwnd_limited(&self, bytes_in_flight: u64) -> bool {
        self.window_snapshot().is_cwnd_limited(bytes_in_flight)
    }

    pub fn window_snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            window_packets: self.state.window,
            segment_size: self.state.mss,
            in_slow_start: self.state.in_slow_start(),
        }
    }

    pub fn window_bytes(&self) -> u64 {
        self.state.window.saturating_mul(self.state.mss)
    }

    pub fn slow_start_threshold_bytes(&self) -> u64 {
        self.state.ssthresh.saturating_mul(self.state.mss)
    }

    pub fn max_window_bytes(&self) -> u64 {
        self.state.max_window.saturating_mul(self.state.mss)
    }

    pub fn congestion_control_type(&self) -> CongestionControlType {
        self.growth.kind()
    }

    pub fn window_packets(&self) -> u64 {
        self.state.window
    }

    pub fn slow_start_threshold_packets(&self) -> u64 {
        self.state.ssthresh
    }

    pub fn min_window_packets(&self) -> u64 {
        self.state.min_window
    }

    pub fn max_window_packets(&self) -> u64 {
        self.state.max_window
    }

    pub fn num_emulated_connections(&self) -> u32 {
        self.state.num_connections
    }

    pub fn in_slow_start(&self) -> bool {
        self.state.in_slow_start()
    }

    pub fn largest_sent_at_last_cutback(&self) -> Option<PacketNumber> {
        self.state.largest_sent_at_last_cutback
    }

    pub fn reno_ack_count(&self) -> Option<u64> {
        self.growth.reno_ack_count()
    }

    pub fn state(&self) -> &CongestionState {
        &self.state
    }

    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    pub fn pacer_mut(&mut self) -> &mut P {
        &mut self.pacer
    }
}
