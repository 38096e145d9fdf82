//! crates/promptt_core/src/optimistic.rs
//!
//! Two-phase helper for UI-optimistic writes: apply the new value locally,
//! then either commit it or roll it back once the remote call settles.

use crate::ports::PortResult;

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "an optimistic write must be settled"]
pub struct OptimisticWrite<T> {
    previous: T,
    applied: T,
}

impl<T: Clone + PartialEq> OptimisticWrite<T> {
    /// Writes `next` into `slot`, remembering what was there.
    pub fn apply(slot: &mut T, next: T) -> Self {
        let previous = std::mem::replace(slot, next.clone());
        Self {
            previous,
            applied: next,
        }
    }

    pub fn applied(&self) -> &T {
        &self.applied
    }

    /// Commits on `Ok`, otherwise restores the previous value. `slot` is `None` when
    /// the target disappeared while the call was in flight. A slot that changed
    /// again in the meantime is left alone.
    pub fn settle(self, outcome: PortResult<()>, slot: Option<&mut T>) -> PortResult<T> {
        match outcome {
            Ok(()) => Ok(self.applied),
            Err(e) => {
                if let Some(slot) = slot {
                    if *slot == self.applied {
                        *slot = self.previous;
                    }
                }
                Err(e)
            }
        }
    }
}
