use crate::utils::mul_ratio;

// Multiplicative decrease factor of a single Reno flow, as a ratio.
// 0.7 = RENO_BETA_NUM / RENO_BETA_DEN.
const RENO_BETA_NUM: u64 = 7;
const RENO_BETA_DEN: u64 = 10;

/// The window after a loss event when emulating `num_connections` flows:
/// `window * (n - 1 + 0.7) / n`.
///
/// Only one of the emulated flows backs off, so the aggregate reduction gets
/// milder the more flows are emulated.
pub fn window_after_loss(window_packets: u64, num_connections: u32) -> u64 {
    let n = num_connections.max(1) as u64;
    mul_ratio(
        window_packets,
        RENO_BETA_DEN * (n - 1) + RENO_BETA_NUM,
        RENO_BETA_DEN * n,
    )
}

/// Classic Reno congestion avoidance: one packet of growth per window worth of
/// acks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Reno {
    ack_count: u64,
}

impl Reno {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ack_count(&self) -> u64 {
        self.ack_count
    }

    /// Count one acked packet. Returns the new window.
    pub fn on_ack(&mut self, window_packets: u64, num_connections: u32) -> u64 {
        self.ack_count += 1;
        // Multiplying by num_connections grows the window faster than
        // conventional Reno, as if that many flows were sharing the path.
        if self.ack_count.saturating_mul(num_connections.max(1) as u64) >= window_packets {
            self.ack_count = 0;
            return window_packets.saturating_add(1);
        }
        window_packets
    }

    pub fn reset(&mut self) {
        self.ack_count = 0;
    }
}
