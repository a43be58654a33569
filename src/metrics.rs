use lazy_static::lazy_static;

#[cfg(feature = "export-metrics")]
use metrics::{Counter, counter};

#[cfg(not(feature = "export-metrics"))]
#[derive(Default)]
pub struct Counter;

#[cfg(not(feature = "export-metrics"))]
impl Counter {
    #[inline(always)]
    pub fn increment(&self, _value: u64) {}
}

#[cfg(not(feature = "export-metrics"))]
macro_rules! counter {
    ($name:expr) => {
        Counter
    };
}

pub struct Metrics {
    pub application_limited_acks: Counter,
    pub bug_growth_in_recovery: Counter,
    pub bug_slow_start_reduction_at_min: Counter,
    pub connection_migrations: Counter,
    pub duplicate_loss_notifications: Counter,
    pub loss_events: Counter,
    pub retransmission_timeouts: Counter,
    pub slow_start_packets_lost: Counter,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            application_limited_acks: counter!("cc_application_limited_acks"),
            bug_growth_in_recovery: counter!("cc_bug_growth_in_recovery"),
            bug_slow_start_reduction_at_min: counter!("cc_bug_slow_start_reduction_at_min"),
            connection_migrations: counter!("cc_connection_migrations"),
            duplicate_loss_notifications: counter!("cc_duplicate_loss_notifications"),
            loss_events: counter!("cc_loss_events"),
            retransmission_timeouts: counter!("cc_retransmission_timeouts"),
            slow_start_packets_lost: counter!("cc_slow_start_packets_lost"),
        }
    }
}

lazy_static! {
    pub static ref METRICS: Metrics = Metrics::new();
}
