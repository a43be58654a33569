use std::ops::Deref;

/// Packet numbers never wrap, so the ordering is plain integer ordering.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default, Hash)]
pub struct PacketNumber(pub u64);

impl Deref for PacketNumber {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<u64> for PacketNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for PacketNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Debug for PacketNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::ops::Add<u64> for PacketNumber {
    type Output = PacketNumber;

    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0.saturating_add(rhs))
    }
}

impl std::ops::AddAssign<u64> for PacketNumber {
    fn add_assign(&mut self, rhs: u64) {
        *self = *self + rhs;
    }
}
