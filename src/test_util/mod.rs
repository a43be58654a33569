use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;

use crate::{
    config::{SenderOpts, ValidatedSenderOpts},
    congestion::Growth,
    packet_number::PacketNumber,
    recovery::PrrSender,
    sender::{CubicSender, WindowSnapshot},
    traits::{ConnectionState, GrowthCalculator, RecoveryPacer, RttProvider},
};

pub use env::MockClock;

pub mod env;

pub fn setup_test_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// The parts of a connection the sender consults, settable from tests.
#[derive(Debug, Clone)]
pub struct MockConnection {
    pub min_rtt: Duration,
    pub in_recovery: bool,
    pub largest_sent: Option<PacketNumber>,
    // None means use the default cwnd-limited rule.
    pub cwnd_limited: Option<bool>,
}

impl Default for MockConnection {
    fn default() -> Self {
        Self {
            min_rtt: Duration::from_millis(100),
            in_recovery: false,
            largest_sent: None,
            cwnd_limited: Some(true),
        }
    }
}

impl MockConnection {
    pub fn sent(&mut self, packet_number: u64) {
        self.largest_sent = Some(PacketNumber(packet_number));
    }
}

impl RttProvider for MockConnection {
    fn min_rtt(&self) -> Duration {
        self.min_rtt
    }
}

impl ConnectionState for MockConnection {
    fn in_recovery(&self) -> bool {
        self.in_recovery
    }

    fn largest_sent_packet(&self) -> Option<PacketNumber> {
        self.largest_sent
    }

    fn is_cwnd_limited(&self, bytes_in_flight: u64, window: &WindowSnapshot) -> bool {
        self.cwnd_limited
            .unwrap_or_else(|| window.is_cwnd_limited(bytes_in_flight))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculatorCall {
    AfterAck { window: u64, min_rtt: Duration },
    AfterLoss { window: u64 },
    Reset,
    ApplicationLimited,
    SetNumConnections(u32),
}

/// Growth calculator returning fixed answers and recording every call.
#[derive(Debug, Clone)]
pub struct MockCalculator {
    pub calls: Arc<Mutex<Vec<CalculatorCall>>>,
    pub ack_result: Arc<Mutex<u64>>,
    pub loss_result: Arc<Mutex<u64>>,
}

impl MockCalculator {
    pub fn new(ack_result: u64, loss_result: u64) -> Self {
        Self {
            calls: Default::default(),
            ack_result: Arc::new(Mutex::new(ack_result)),
            loss_result: Arc::new(Mutex::new(loss_result)),
        }
    }

    pub fn take_calls(&self) -> Vec<CalculatorCall> {
        std::mem::take(&mut *self.calls.lock())
    }
}

impl GrowthCalculator for MockCalculator {
    fn after_ack(&mut self, window: u64, min_rtt: Duration) -> u64 {
        self.calls
            .lock()
            .push(CalculatorCall::AfterAck { window, min_rtt });
        *self.ack_result.lock()
    }

    fn after_loss(&mut self, window: u64) -> u64 {
        self.calls.lock().push(CalculatorCall::AfterLoss { window });
        *self.loss_result.lock()
    }

    fn reset(&mut self) {
        self.calls.lock().push(CalculatorCall::Reset);
    }

    fn on_application_limited(&mut self) {
        self.calls.lock().push(CalculatorCall::ApplicationLimited);
    }

    fn set_num_connections(&mut self, num_connections: u32) {
        self.calls
            .lock()
            .push(CalculatorCall::SetNumConnections(num_connections));
    }
}

/// Records the bytes in flight of every loss it was told about.
#[derive(Debug, Default)]
pub struct MockPacer {
    pub losses: Vec<u64>,
    pub migrations: usize,
}

impl RecoveryPacer for MockPacer {
    fn on_packet_lost(&mut self, bytes_in_flight: u64) {
        self.losses.push(bytes_in_flight);
    }

    fn on_connection_migration(&mut self) {
        self.migrations += 1;
    }
}

pub fn validated(opts: SenderOpts) -> ValidatedSenderOpts {
    opts.validate().unwrap()
}

pub fn reno_sender(opts: SenderOpts) -> CubicSender<MockPacer> {
    CubicSender::new(&validated(opts), Growth::reno(), MockPacer::default())
}

pub fn calculator_sender(
    opts: SenderOpts,
    calculator: MockCalculator,
) -> CubicSender<MockPacer> {
    CubicSender::new(
        &validated(opts),
        Growth::cubic(calculator),
        MockPacer::default(),
    )
}

pub fn cubic_sender(opts: SenderOpts, clock: MockClock) -> CubicSender<PrrSender> {
    validated(opts).create_sender(clock)
}
