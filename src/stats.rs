/// Loss counters accumulated by the sender for the owning connection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Packets lost while the last cutback happened in slow start, including
    /// the packet that triggered the cutback.
    pub slowstart_packets_lost: u64,
    /// Bytes of the lost packets above, excluding the first one.
    pub slowstart_bytes_lost: u64,
    /// Distinct loss events, i.e. window cutbacks.
    pub loss_events: u64,
}
