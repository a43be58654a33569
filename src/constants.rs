use std::time::Duration;

use tracing::Level;

// Constants based on TCP defaults.
pub const DEFAULT_TCP_MSS: u64 = 1460;

// The minimum cwnd based on RFC 3782 (TCP NewReno) for cwnd reductions on a
// fast retransmission. The cwnd after a timeout is still 1.
pub const DEFAULT_MIN_CONGESTION_WINDOW: u64 = 2;

pub const DEFAULT_INITIAL_CONGESTION_WINDOW: u64 = 10;
pub const DEFAULT_MAX_CONGESTION_WINDOW: u64 = 200;

// Bounds applied when seeding the window from cached network parameters.
pub const MIN_CONGESTION_WINDOW_FOR_BANDWIDTH_RESUMPTION: u64 = 10;
pub const MAX_CONGESTION_WINDOW_FOR_BANDWIDTH_RESUMPTION: u64 = 200;

pub const DEFAULT_NUM_CONNECTIONS: u32 = 2;

// How many segments may be sent back to back while still counting as
// cwnd-limited.
pub const MAX_BURST_PACKETS: u64 = 3;

// Before the first sample.
pub const INITIAL_RTT: Duration = Duration::from_millis(100);

pub const CONGESTION_TRACING_LOG_LEVEL: Level = Level::DEBUG;
pub const RTT_TRACING_LOG_LEVEL: Level = Level::TRACE;
