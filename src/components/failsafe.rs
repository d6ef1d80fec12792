use std::fmt;

/// Structural state of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailSafeStatus {
    #[default]
    Running,
    Tripped,
}

impl fmt::Display for FailSafeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "RUNNING"),
            Self::Tripped => write!(f, "TRIPPED"),
        }
    }
}

/// Watches a panel's displacement against its structural limit.
///
/// `Running → Tripped` once `|y| > y_max`. Tripped is latched until
/// [`FailSafeMonitor::reset`].
#[derive(Debug, Clone, PartialEq)]
pub struct FailSafeMonitor {
    limit_m: f64,
    status: FailSafeStatus,
    tripped_at: Option<f64>,
}

impl FailSafeMonitor {
    pub fn new(limit_m: f64) -> Self {
        Self {
            limit_m: limit_m.abs(),
            status: FailSafeStatus::Running,
            tripped_at: None,
        }
    }

    /// Evaluates a post-step displacement and returns the resulting status.
    ///
    /// Returns `true` in the second field when this call caused the trip.
    pub fn check(&mut self, displacement: f64, time_s: f64) -> (FailSafeStatus, bool) {
        if self.status == FailSafeStatus::Tripped {
            return (self.status, false);
        }
        if displacement.abs() > self.limit_m {
            self.status = FailSafeStatus::Tripped;
            self.tripped_at = Some(time_s);
            return (self.status, true);
        }
        (self.status, false)
    }

    pub fn status(&self) -> FailSafeStatus {
        self.status
    }

    pub fn is_tripped(&self) -> bool {
        self.status == FailSafeStatus::Tripped
    }

    /// Simulated time of the trip, if any.
    pub fn tripped_at(&self) -> Option<f64> {
        self.tripped_at
    }

    pub fn limit(&self) -> f64 {
        self.limit_m
    }

    pub fn reset(&mut self) {
        self.status = FailSafeStatus::Running;
        self.tripped_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_running_within_limit() {
        let mut m = FailSafeMonitor::new(0.01);
        assert_eq!(m.check(0.01, 0.0), (FailSafeStatus::Running, false));
        assert_eq!(m.check(-0.0099, 0.1), (FailSafeStatus::Running, false));
    }

    #[test]
    fn trips_once_and_latches() {
        let mut m = FailSafeMonitor::new(0.01);
        assert_eq!(m.check(-0.0101, 0.5), (FailSafeStatus::Tripped, true));
        assert_eq!(m.check(0.0, 0.6), (FailSafeStatus::Tripped, false));
        assert_eq!(m.tripped_at(), Some(0.5));
        assert!(m.is_tripped());
    }

    #[test]
    fn reset_rearms() {
        let mut m = FailSafeMonitor::new(0.01);
        m.check(1.0, 0.0);
        m.reset();
        assert_eq!(m.status(), FailSafeStatus::Running);
        assert_eq!(m.tripped_at(), None);
    }

    #[test]
    fn status_display() {
        assert_eq!(FailSafeStatus::Running.to_string(), "RUNNING");
        assert_eq!(FailSafeStatus::Tripped.to_string(), "TRIPPED");
    }
}
