use crate::{
    congestion::{CongestionControlType, Growth, cubic::Cubic, tracing::TracingCalculator},
    constants::{
        DEFAULT_INITIAL_CONGESTION_WINDOW, DEFAULT_MAX_CONGESTION_WINDOW,
        DEFAULT_MIN_CONGESTION_WINDOW, DEFAULT_NUM_CONNECTIONS, DEFAULT_TCP_MSS,
    },
    error::{Error, Result},
    recovery::PrrSender,
    sender::CubicSender,
    traits::Clock,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct SenderOpts {
    /// Which growth algorithm to run. CUBIC by default.
    pub kind: CongestionControlType,

    /// Log every change of the CUBIC calculator state.
    pub tracing: bool,

    /// Window at start and after connection migration, in packets.
    pub initial_window_packets: Option<u64>,

    /// The window never drops below this many packets.
    pub min_window_packets: Option<u64>,

    /// The window never grows past this many packets.
    pub max_window_packets: Option<u64>,

    /// Bytes per packet, used for all byte to packet conversions.
    pub max_segment_size: Option<u64>,

    /// Grow and back off as if this many flows shared the path.
    pub num_emulated_connections: Option<u32>,

    /// When a loss happens in slow start, reduce the window by one packet per
    /// loss instead of cutting it by beta.
    pub slow_start_large_reduction: bool,

    /// With slow_start_large_reduction, reduce per lost packet rather than per
    /// mss worth of lost bytes.
    pub disable_byte_conservation: bool,
}

impl SenderOpts {
    pub fn validate(&self) -> Result<ValidatedSenderOpts> {
        let max_segment_size = self.max_segment_size.unwrap_or(DEFAULT_TCP_MSS);
        if max_segment_size == 0 {
            return Err(Error::ZeroSegmentSize);
        }

        let min_window = self
            .min_window_packets
            .unwrap_or(DEFAULT_MIN_CONGESTION_WINDOW);
        if min_window == 0 {
            return Err(Error::ZeroMinWindow);
        }

        let num_emulated_connections = self
            .num_emulated_connections
            .unwrap_or(DEFAULT_NUM_CONNECTIONS);
        if num_emulated_connections == 0 {
            return Err(Error::ZeroEmulatedConnections);
        }

        let max_window = self
            .max_window_packets
            .unwrap_or(DEFAULT_MAX_CONGESTION_WINDOW);
        if min_window > max_window {
            return Err(Error::MinAboveMax {
                min_window,
                max_window,
            });
        }

        let initial_window = self
            .initial_window_packets
            .unwrap_or(DEFAULT_INITIAL_CONGESTION_WINDOW);
        if !(min_window..=max_window).contains(&initial_window) {
            return Err(Error::InitialWindowOutOfRange {
                initial_window,
                min_window,
                max_window,
            });
        }

        Ok(ValidatedSenderOpts {
            kind: self.kind,
            tracing: self.tracing,
            initial_window_packets: initial_window,
            min_window_packets: min_window,
            max_window_packets: max_window,
            max_segment_size,
            num_emulated_connections,
            slow_start_large_reduction: self.slow_start_large_reduction,
            byte_conservation: !self.disable_byte_conservation,
        })
    }

    /// Validate and build a sender with the default CUBIC calculator and PRR.
    pub fn create_sender<C: Clock>(&self, clock: C) -> Result<CubicSender<PrrSender>> {
        let opts = self.validate()?;
        Ok(opts.create_sender(clock))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedSenderOpts {
    pub kind: CongestionControlType,
    pub tracing: bool,
    pub initial_window_packets: u64,
    pub min_window_packets: u64,
    pub max_window_packets: u64,
    pub max_segment_size: u64,
    pub num_emulated_connections: u32,
    pub slow_start_large_reduction: bool,
    pub byte_conservation: bool,
}

impl ValidatedSenderOpts {
    pub fn growth<C: Clock>(&self, clock: C) -> Growth {
        match (self.kind, self.tracing) {
            (CongestionControlType::Reno, _) => Growth::reno(),
            (CongestionControlType::Cubic, true) => {
                tracing::debug!("enabling congestion tracing");
                Growth::cubic(TracingCalculator::new(Cubic::new(clock)))
            }
            (CongestionControlType::Cubic, false) => Growth::cubic(Cubic::new(clock)),
        }
    }

    pub fn create_sender<C: Clock>(&self, clock: C) -> CubicSender<PrrSender> {
        CubicSender::new(
            self,
            self.growth(clock),
            PrrSender::new(self.max_segment_size),
        )
    }
}
