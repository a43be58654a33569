#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("max_segment_size must be non-zero")]
    ZeroSegmentSize,

    #[error("min_window_packets must be at least 1")]
    ZeroMinWindow,

    #[error("num_emulated_connections must be at least 1")]
    ZeroEmulatedConnections,

    #[error("min window ({min_window}) exceeds max window ({max_window})")]
    MinAboveMax { min_window: u64, max_window: u64 },

    #[error("initial window ({initial_window}) outside of [{min_window}, {max_window}]")]
    InitialWindowOutOfRange {
        initial_window: u64,
        min_window: u64,
        max_window: u64,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
