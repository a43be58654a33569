use std::time::{Duration, Instant};

use crate::{packet_number::PacketNumber, sender::WindowSnapshot};

/// Source of the minimum round-trip time.
pub trait RttProvider {
    fn min_rtt(&self) -> Duration;
}

/// Window growth for the convex (CUBIC) algorithm. All windows are in packets.
pub trait GrowthCalculator: Send + core::fmt::Debug {
    /// The new window after one acknowledged packet in congestion avoidance.
    fn after_ack(&mut self, window_packets: u64, min_rtt: Duration) -> u64;

    /// The new window after a loss event.
    fn after_loss(&mut self, window_packets: u64) -> u64;

    /// Forget all history. Called on RTO and path migration.
    fn reset(&mut self);

    /// The sender isn't using the window. Growth should not continue.
    fn on_application_limited(&mut self);

    fn set_num_connections(&mut self, num_connections: u32);
}

/// Tracks transmission state while in loss recovery. Has no say in the window.
pub trait RecoveryPacer: Send + core::fmt::Debug {
    fn on_packet_lost(&mut self, bytes_in_flight: u64);

    fn on_connection_migration(&mut self) {}
}

/// What the controller needs to know about the connection it belongs to.
pub trait ConnectionState: RttProvider {
    /// Loss recovery is in progress. Ack-driven growth must not happen.
    fn in_recovery(&self) -> bool;

    /// The largest packet number sent so far, if any.
    fn largest_sent_packet(&self) -> Option<PacketNumber>;

    /// Whether `bytes_in_flight` uses the window closely enough to justify
    /// growing it.
    fn is_cwnd_limited(&self, bytes_in_flight: u64, window: &WindowSnapshot) -> bool {
        window.is_cwnd_limited(bytes_in_flight)
    }
}

pub trait Clock: Send + 'static {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultClock;

impl Clock for DefaultClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
