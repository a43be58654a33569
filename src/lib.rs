//! Loss-based congestion window controller for packet-oriented transports.
//!
//! The window is counted in whole packets. [`CubicSender`] grows it in slow
//! start and congestion avoidance (Reno or CUBIC), cuts it back once per loss
//! episode, collapses it on retransmission timeout and resets it on path
//! migration.

#[macro_use]
mod macros;

mod bandwidth;
mod config;
mod congestion;
mod constants;
mod error;
mod metrics;
mod packet_number;
mod recovery;
mod rtt;
mod sender;
mod stats;
#[cfg(test)]
mod test_util;
mod traits;
mod utils;

pub use bandwidth::Bandwidth;
pub use config::{SenderOpts, ValidatedSenderOpts};
pub use congestion::{
    CongestionControlType, Growth,
    cubic::{Cubic, CubicState},
    reno::Reno,
    tracing::{Snapshot, TracingCalculator},
};
pub use constants::DEFAULT_TCP_MSS;
pub use error::{Error, Result};
pub use packet_number::PacketNumber;
pub use recovery::PrrSender;
pub use rtt::RttStats;
pub use sender::{CongestionState, CubicSender, WindowSnapshot};
pub use stats::ConnectionStats;
pub use traits::{
    Clock, ConnectionState, DefaultClock, GrowthCalculator, RecoveryPacer, RttProvider,
};
