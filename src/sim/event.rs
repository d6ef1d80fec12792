use super::params::ParameterUpdate;

/// A scripted wind speed change delivered at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindChange {
    /// Tick index at which the new speed takes effect.
    pub tick: usize,
    /// New wind speed (m/s).
    pub wind_speed: f64,
}

/// Ordered list of scripted wind changes.
///
/// The engine feeds due changes through its parameter inbox, exactly like an
/// external collaborator would.
#[derive(Debug, Clone, Default)]
pub struct WindSchedule {
    changes: Vec<WindChange>,
    next: usize,
}

impl WindSchedule {
    /// Creates a schedule; changes are sorted by tick, later entries win on ties.
    pub fn new(mut changes: Vec<WindChange>) -> Self {
        changes.sort_by_key(|c| c.tick);
        Self { changes, next: 0 }
    }

    /// Returns the merged update due at `tick`, consuming every change scheduled
    /// at or before it.
    pub fn due(&mut self, tick: usize) -> Option<ParameterUpdate> {
        let mut update: Option<ParameterUpdate> = None;
        while let Some(change) = self.changes.get(self.next) {
            if change.tick > tick {
                break;
            }
            update = Some(ParameterUpdate::wind_speed(change.wind_speed));
            self.next += 1;
        }
        update
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Rewinds to the first change.
    pub fn rewind(&mut self) {
        self.next = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> WindSchedule {
        WindSchedule::new(vec![
            WindChange {
                tick: 10,
                wind_speed: 8.0,
            },
            WindChange {
                tick: 0,
                wind_speed: 2.0,
            },
            WindChange {
                tick: 10,
                wind_speed: 9.0,
            },
        ])
    }

    #[test]
    fn delivers_changes_at_their_tick() {
        let mut s = schedule();
        assert_eq!(s.due(0).and_then(|u| u.wind_speed), Some(2.0));
        assert!(s.due(5).is_none());
        assert_eq!(s.due(10).and_then(|u| u.wind_speed), Some(9.0));
        assert!(s.due(11).is_none());
    }

    #[test]
    fn skipped_ticks_deliver_latest() {
        let mut s = schedule();
        assert_eq!(s.due(50).and_then(|u| u.wind_speed), Some(9.0));
    }

    #[test]
    fn rewind_replays() {
        let mut s = schedule();
        s.due(100);
        s.rewind();
        assert_eq!(s.due(0).and_then(|u| u.wind_speed), Some(2.0));
    }

    #[test]
    fn empty_schedule_never_fires() {
        let mut s = WindSchedule::default();
        assert!(s.is_empty());
        assert!(s.due(0).is_none());
    }
}
