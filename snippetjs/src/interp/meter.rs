//! Resource budget for one interpretation call

use crate::error::{Result, SnippetError};

/// Counts work units against a fixed budget
#[derive(Debug, Clone)]
pub struct Meter {
    limit: u64,
    used: u64,
}

impl Meter {
    pub fn new(limit: u64) -> Self {
        Meter { limit, used: 0 }
    }

    /// Charge `units`. Fails once the total passes the limit.
    pub fn charge(&mut self, units: u64) -> Result<()> {
        self.used = self.used.saturating_add(units);
        if self.used > self.limit {
            log::debug!("budget of {} exhausted", self.limit);
            return Err(SnippetError::exhausted("resource budget exhausted"));
        }
        Ok(())
    }

    pub fn used(&self) -> u64 {
        self.used
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_within_limit() {
        let mut meter = Meter::new(10);
        meter.charge(4).unwrap();
        meter.charge(6).unwrap();
        assert_eq!(meter.used(), 10);
        assert!(meter.charge(1).is_err());
    }

    #[test]
    fn test_charge_past_limit() {
        let mut meter = Meter::new(3);
        let err = meter.charge(4).unwrap_err();
        assert_eq!(err.message(), "resource budget exhausted");
    }

    #[test]
    fn test_charge_saturates() {
        let mut meter = Meter::new(u64::MAX);
        meter.charge(u64::MAX).unwrap();
        meter.charge(1).unwrap();
        assert_eq!(meter.used(), u64::MAX);
    }
}
