//! Step identifier allocation.

use crate::{Error, Result, StepId};

/// Monotonic counter issuing [`StepId`]s.
///
/// Each call to [`allocate`](Self::allocate) returns the current counter value
/// and increments it. A fresh graph starts at `1`; a graph rebuilt from storage
/// continues at one past its largest step id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepAllocator {
    next: u32,
}

impl StepAllocator {
    /// Create an allocator whose first id is `1`.
    #[must_use]
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Reset the counter so the next allocation returns `n`.
    pub fn set_next_number(&mut self, n: u32) {
        self.next = n;
    }

    /// Return the current counter value as a step id and advance the counter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedGraph`] once the id space is exhausted. The
    /// counter never wraps back to the root sentinel.
    pub fn allocate(&mut self) -> Result<StepId> {
        let id = StepId(self.next);
        self.next = Self::successor(id)?;
        Ok(id)
    }

    /// The id the next allocation will return.
    #[must_use]
    pub fn peek(&self) -> StepId {
        StepId(self.next)
    }

    /// Advance the counter past `existing` if it is not already.
    pub(crate) fn ensure_above(&mut self, existing: StepId) -> Result<()> {
        if self.next <= existing.0 {
            self.next = Self::successor(existing)?;
        }
        Ok(())
    }

    fn successor(step: StepId) -> Result<u32> {
        step.0
            .checked_add(1)
            .ok_or_else(|| Error::malformed(format!("no step id left after {step}")))
    }
}

impl Default for StepAllocator {
    fn default() -> Self {
        Self::new()
    }
}
