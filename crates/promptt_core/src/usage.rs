//! crates/promptt_core/src/usage.rs
//!
//! The client-side "daily uses left" hint. The server's `DailyUsage` is the
//! authority; this counter only avoids a round trip that is bound to fail.

use crate::domain::DailyUsage;

/// Free generations per day.
pub const FREE_DAILY_ALLOTMENT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageCounter {
    allotment: u32,
    left: u32,
}

impl Default for UsageCounter {
    fn default() -> Self {
        Self::new(FREE_DAILY_ALLOTMENT)
    }
}

impl UsageCounter {
    pub fn new(allotment: u32) -> Self {
        Self {
            allotment,
            left: allotment,
        }
    }

    pub fn daily_uses_left(&self) -> u32 {
        self.left
    }

    pub fn is_exhausted(&self) -> bool {
        self.left == 0
    }

    /// Records one successful generation. Floors at zero.
    pub fn consume(&mut self) {
        self.left = self.left.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.left = self.allotment;
    }

    /// Adopts the server's figure as the new hint.
    pub fn sync(&mut self, usage: &DailyUsage) {
        self.allotment = usage.limit;
        self.left = usage.remaining();
    }
}
