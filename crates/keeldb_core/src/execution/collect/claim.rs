use std::sync::atomic::{AtomicBool, Ordering};

/// Outcome of attempting a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Won,
    Lost,
}

/// First-writer-wins claim over the single sink invocation.
///
/// Both `start` and `kill` race through this one operation, so there is no
/// window in which each side could conclude the other hasn't fired.
#[derive(Debug, Default)]
pub struct SinkClaim {
    claimed: AtomicBool,
}

impl SinkClaim {
    pub const fn new() -> Self {
        SinkClaim {
            claimed: AtomicBool::new(false),
        }
    }

    /// Attempt the claim.
    ///
    /// Exactly one caller across the lifetime of the claim observes `Won`.
    pub fn claim(&self) -> ClaimOutcome {
        match self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => ClaimOutcome::Won,
            Err(_) => ClaimOutcome::Lost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_winner() {
        let claim = SinkClaim::new();
        assert_eq!(ClaimOutcome::Won, claim.claim());
        assert_eq!(ClaimOutcome::Lost, claim.claim());
        assert_eq!(ClaimOutcome::Lost, claim.claim());
    }
}
