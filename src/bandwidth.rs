use std::time::Duration;

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Bandwidth {
    bits_per_second: u64,
}

impl Bandwidth {
    pub const fn zero() -> Self {
        Self { bits_per_second: 0 }
    }

    pub const fn from_bits_per_second(bits_per_second: u64) -> Self {
        Self { bits_per_second }
    }

    pub const fn from_kbits_per_second(kbits_per_second: u64) -> Self {
        Self {
            bits_per_second: kbits_per_second.saturating_mul(1000),
        }
    }

    pub const fn from_bytes_per_second(bytes_per_second: u64) -> Self {
        Self {
            bits_per_second: bytes_per_second.saturating_mul(8),
        }
    }

    /// Bandwidth that delivers `bytes` every `period`.
    pub fn from_bytes_and_period(bytes: u64, period: Duration) -> Self {
        let micros = period.as_micros();
        if micros == 0 {
            return Self::zero();
        }
        let bps = bytes as u128 * 8 * 1_000_000 / micros;
        Self::from_bits_per_second(bps.min(u64::MAX as u128) as u64)
    }

    pub fn bits_per_second(&self) -> u64 {
        self.bits_per_second
    }

    /// How many bytes fit into `period` at this rate, i.e. the bandwidth-delay
    /// product when `period` is the RTT.
    pub fn to_bytes_per_period(&self, period: Duration) -> u64 {
        let bytes = self.bits_per_second as u128 * period.as_micros() / 8 / 1_000_000;
        bytes.min(u64::MAX as u128) as u64
    }
}

impl std::fmt::Debug for Bandwidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}bps", self.bits_per_second)
    }
}
