//! Epoch clock
//!
//! Converts block heights into epoch numbers and detects epoch boundaries.
//! Epochs are fixed-length windows of `epoch_length` blocks.

/// Maps block heights to epochs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpochClock {
    epoch_length: u64,
}

impl EpochClock {
    /// Create a clock with the given epoch length. A zero length is clamped
    /// to one so the clock never divides by zero.
    pub fn new(epoch_length: u64) -> Self {
        Self {
            epoch_length: epoch_length.max(1),
        }
    }

    /// Epoch containing the given block height.
    pub fn epoch_of(&self, block_number: u64) -> u64 {
        block_number / self.epoch_length
    }

    /// First block height of the given epoch.
    pub fn start_block(&self, epoch: u64) -> u64 {
        epoch.saturating_mul(self.epoch_length)
    }

    /// True when the block height sits exactly on an epoch boundary.
    pub fn is_boundary(&self, block_number: u64) -> bool {
        block_number % self.epoch_length == 0
    }

    pub fn epoch_length(&self) -> u64 {
        self.epoch_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_of_integer_division() {
        let clock = EpochClock::new(50);
        assert_eq!(clock.epoch_of(0), 0);
        assert_eq!(clock.epoch_of(49), 0);
        assert_eq!(clock.epoch_of(50), 1);
        assert_eq!(clock.epoch_of(149), 2);
        assert_eq!(clock.epoch_of(150), 3);
    }

    #[test]
    fn start_block_inverts_epoch_of() {
        let clock = EpochClock::new(50);
        for epoch in 0..10 {
            assert_eq!(clock.epoch_of(clock.start_block(epoch)), epoch);
        }
    }

    #[test]
    fn boundary_detection() {
        let clock = EpochClock::new(32);
        assert!(clock.is_boundary(0));
        assert!(clock.is_boundary(64));
        assert!(!clock.is_boundary(65));
    }

    #[test]
    fn zero_length_clamped() {
        let clock = EpochClock::new(0);
        assert_eq!(clock.epoch_length(), 1);
        assert_eq!(clock.epoch_of(7), 7);
    }
}
