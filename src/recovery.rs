//! Implements RFC 6937 "Proportional Rate Reduction for TCP", with the
//! slow start reduction bound (PRR-SSRB) once the pipe drops below ssthresh.
//!
//! The sender owns an instance and reports loss to it. The connection reports
//! sends and acks, and asks `can_send` while in recovery.
use tracing::trace;

use crate::{constants::DEFAULT_TCP_MSS, traits::RecoveryPacer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrrSender {
    mss: u64,
    // Bytes sent and delivered since the last loss event, named as in the RFC.
    prr_out: u64,
    prr_delivered: u64,
    ack_count_since_loss: u64,
    // "RecoverFS" in the RFC.
    bytes_in_flight_before_loss: u64,
}

impl Default for PrrSender {
    fn default() -> Self {
        Self::new(DEFAULT_TCP_MSS)
    }
}

impl PrrSender {
    pub fn new(mss: u64) -> Self {
        Self {
            mss,
            prr_out: 0,
            prr_delivered: 0,
            ack_count_since_loss: 0,
            bytes_in_flight_before_loss: 0,
        }
    }

    pub fn on_packet_sent(&mut self, sent_bytes: u64) {
        self.prr_out += sent_bytes;
    }

    pub fn on_packet_acked(&mut self, acked_bytes: u64) {
        self.prr_delivered += acked_bytes;
        self.ack_count_since_loss += 1;
    }

    /// Whether one more segment may be sent during recovery.
    pub fn can_send(&self, cwnd_bytes: u64, bytes_in_flight: u64, ssthresh_bytes: u64) -> bool {
        // Always allow limited transmit.
        if self.prr_out == 0 || bytes_in_flight < self.mss {
            return true;
        }

        if cwnd_bytes > bytes_in_flight {
            // PRR-SSRB: at most one extra MSS per ack instead of the whole
            // available window, so more losses than the cwnd reduction don't
            // turn into a burst of retransmits.
            return self.prr_delivered + self.ack_count_since_loss * self.mss > self.prr_out;
        }

        // Division-free form of
        // CEIL(prr_delivered * ssthresh / RecoverFS) - prr_out > 0
        self.prr_delivered as u128 * ssthresh_bytes as u128 + self.mss as u128
            > self.prr_out as u128 * self.bytes_in_flight_before_loss as u128
    }
}

impl RecoveryPacer for PrrSender {
    fn on_packet_lost(&mut self, bytes_in_flight: u64) {
        trace!(bytes_in_flight, "prr: loss, starting new reduction");
        self.prr_out = 0;
        self.bytes_in_flight_before_loss = bytes_in_flight;
        self.prr_delivered = 0;
        self.ack_count_since_loss = 0;
    }

    fn on_connection_migration(&mut self) {
        *self = Self::new(self.mss);
    }
}

#[cfg(test)]
mod tests {
    use crate::traits::RecoveryPacer;

    use super::PrrSender;

    const MSS: u64 = 1000;

    #[test]
    fn test_limited_transmit_always_allowed() {
        let mut prr = PrrSender::new(MSS);
        prr.on_packet_lost(10 * MSS);
        // Nothing sent since loss.
        assert!(prr.can_send(5 * MSS, 9 * MSS, 5 * MSS));

        prr.on_packet_sent(MSS);
        // Less than one MSS in flight.
        assert!(prr.can_send(5 * MSS, MSS - 1, 5 * MSS));
    }

    #[test]
    fn test_proportional_reduction() {
        // Loss with 20 packets in flight, ssthresh halves: one packet may be
        // sent for every two acked.
        let mut prr = PrrSender::new(MSS);
        let ssthresh = 10 * MSS;
        let mut in_flight = 20 * MSS;
        prr.on_packet_lost(in_flight);
        in_flight -= MSS;

        prr.on_packet_sent(MSS);
        in_flight += MSS;

        let mut sent = 0;
        for _ in 0..10 {
            prr.on_packet_acked(MSS);
            in_flight -= MSS;
            if prr.can_send(ssthresh, in_flight, ssthresh) {
                prr.on_packet_sent(MSS);
                in_flight += MSS;
                sent += 1;
            }
        }
        assert_eq!(sent, 5);
    }

    #[test]
    fn test_slow_start_reduction_bound() {
        // Window above in flight: one extra MSS per ack.
        let mut prr = PrrSender::new(MSS);
        prr.on_packet_lost(10 * MSS);
        prr.on_packet_sent(MSS);
        assert!(!prr.can_send(10 * MSS, 5 * MSS, 5 * MSS));

        prr.on_packet_acked(MSS);
        assert!(prr.can_send(10 * MSS, 5 * MSS, 5 * MSS));
    }

    #[test]
    fn test_migration_resets() {
        let mut prr = PrrSender::new(MSS);
        prr.on_packet_lost(10 * MSS);
        prr.on_packet_sent(3 * MSS);
        prr.on_connection_migration();
        assert_eq!(prr, PrrSender::new(MSS));
    }
}
