/// One clock tick: its index and the simulated interval it covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Zero-based tick index.
    pub index: usize,
    /// Simulated time at the start of the tick (s).
    pub start_s: f64,
    /// Tick length (s).
    pub dt: f64,
}

/// A simulation clock that hands out ticks of length `dt` up to a total count.
///
/// The step may be changed between ticks with [`Clock::set_dt`]; a tick in
/// progress is never affected.
///
/// # Examples
///
/// ```
/// use piezo_window_sim::sim::clock::Clock;
///
/// let mut clock = Clock::new(3, 0.5);
/// let mut starts = Vec::new();
///
/// clock.run(|tick| starts.push(tick.start_s));
/// assert_eq!(starts, vec![0.0, 0.5, 1.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Clock {
    /// Index of the next tick
    current: usize,
    /// Total ticks to run
    total: usize,
    /// Simulated time at the start of the next tick (s)
    time_s: f64,
    /// Current tick length (s)
    dt: f64,
}

impl Clock {
    /// Creates a clock.
    ///
    /// # Arguments
    ///
    /// * `total` - The total number of ticks the clock will hand out
    /// * `dt` - Tick length in seconds (must be > 0 and finite)
    ///
    /// # Panics
    ///
    /// Panics if `dt` is not positive and finite.
    pub fn new(total: usize, dt: f64) -> Self {
        assert!(dt > 0.0 && dt.is_finite(), "dt must be > 0");
        Self {
            current: 0,
            total,
            time_s: 0.0,
            dt,
        }
    }

    /// Advances the clock by one tick.
    ///
    /// # Returns
    ///
    /// * `Some(tick)` - The tick to execute next
    /// * `None` - If the clock has handed out all its ticks
    pub fn tick(&mut self) -> Option<Tick> {
        if self.current < self.total {
            let tick = Tick {
                index: self.current,
                start_s: self.time_s,
                dt: self.dt,
            };
            self.current += 1;
            self.time_s += self.dt;
            Some(tick)
        } else {
            None
        }
    }

    /// Runs a function for each remaining tick.
    pub fn run(&mut self, mut f: impl FnMut(Tick)) {
        while let Some(tick) = self.tick() {
            f(tick);
        }
    }

    /// Changes the length of subsequent ticks. Ignores non-positive or non-finite values.
    pub fn set_dt(&mut self, dt: f64) -> bool {
        if dt > 0.0 && dt.is_finite() {
            self.dt = dt;
            true
        } else {
            false
        }
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Simulated time elapsed so far (s).
    pub fn elapsed(&self) -> f64 {
        self.time_s
    }

    /// Ticks handed out so far.
    pub fn ticks_done(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clock() {
        let clock = Clock::new(5, 0.001);
        assert_eq!(clock.current, 0);
        assert_eq!(clock.total, 5);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_tick() {
        let mut clock = Clock::new(2, 0.25);
        assert_eq!(clock.tick().map(|t| t.index), Some(0));
        assert_eq!(clock.tick().map(|t| t.start_s), Some(0.25));
        assert_eq!(clock.tick(), None);
        assert!(clock.is_finished());
        assert_eq!(clock.elapsed(), 0.5);
    }

    #[test]
    fn test_run() {
        let mut clock = Clock::new(3, 1.0);
        let mut steps = Vec::new();

        clock.run(|tick| steps.push(tick.index));

        assert_eq!(steps, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_clock() {
        let mut clock = Clock::new(0, 1.0);
        assert_eq!(clock.tick(), None);

        let mut was_called = false;
        clock.run(|_| was_called = true);
        assert!(!was_called);
    }

    #[test]
    fn test_variable_step() {
        let mut clock = Clock::new(3, 1.0);
        clock.tick();
        assert!(clock.set_dt(0.5));
        assert!(!clock.set_dt(-1.0));
        let t = clock.tick();
        assert_eq!(t.map(|t| (t.start_s, t.dt)), Some((1.0, 0.5)));
        assert_eq!(clock.elapsed(), 1.5);
    }

    #[test]
    #[should_panic]
    fn test_zero_dt_panics() {
        Clock::new(1, 0.0);
    }
}
