pub mod cubic;
pub mod reno;
pub mod tracing;

use std::time::Duration;

use crate::traits::GrowthCalculator;

use self::reno::Reno;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CongestionControlType {
    #[default]
    Cubic,
    Reno,
}

/// The window growth algorithm of a sender. Chosen once at construction.
#[derive(Debug)]
pub enum Growth {
    Reno(Reno),
    Cubic(Box<dyn GrowthCalculator>),
}

impl Growth {
    pub fn reno() -> Self {
        Growth::Reno(Reno::new())
    }

    pub fn cubic(calculator: impl GrowthCalculator + 'static) -> Self {
        Growth::Cubic(Box::new(calculator))
    }

    pub fn kind(&self) -> CongestionControlType {
        match self {
            Growth::Reno(_) => CongestionControlType::Reno,
            Growth::Cubic(_) => CongestionControlType::Cubic,
        }
    }

    /// Congestion avoidance step for one acked packet. The result is not yet
    /// clamped.
    pub(crate) fn after_ack(
        &mut self,
        window_packets: u64,
        num_connections: u32,
        min_rtt: impl FnOnce() -> Duration,
    ) -> u64 {
        match self {
            Growth::Reno(reno) => reno.on_ack(window_packets, num_connections),
            Growth::Cubic(calc) => calc.after_ack(window_packets, min_rtt()),
        }
    }

    pub(crate) fn after_loss(&mut self, window_packets: u64, num_connections: u32) -> u64 {
        match self {
            Growth::Reno(_) => reno::window_after_loss(window_packets, num_connections),
            Growth::Cubic(calc) => calc.after_loss(window_packets),
        }
    }

    /// A new growth epoch starts after a loss. Reno restarts counting acks;
    /// CUBIC already handled it in `after_loss`.
    pub(crate) fn on_loss_epoch(&mut self) {
        if let Growth::Reno(reno) = self {
            reno.reset();
        }
    }

    pub(crate) fn on_application_limited(&mut self) {
        if let Growth::Cubic(calc) = self {
            calc.on_application_limited();
        }
    }

    pub(crate) fn reset(&mut self) {
        match self {
            Growth::Reno(reno) => reno.reset(),
            Growth::Cubic(calc) => calc.reset(),
        }
    }

    pub(crate) fn set_num_connections(&mut self, num_connections: u32) {
        if let Growth::Cubic(calc) = self {
            calc.set_num_connections(num_connections);
        }
    }

    pub fn reno_ack_count(&self) -> Option<u64> {
        match self {
            Growth::Reno(reno) => Some(reno.ack_count()),
            Growth::Cubic(_) => None,
        }
    }
}
