use std::collections::VecDeque;

/// Rolling window of per-tick power samples.
///
/// # Examples
///
/// ```
/// use piezo_window_sim::sim::history::PowerHistory;
///
/// let mut h = PowerHistory::new(2);
/// h.push(1.0);
/// h.push(3.0);
/// h.push(5.0);
/// assert_eq!(h.average(), 4.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PowerHistory {
    samples: VecDeque<f64>,
    capacity: usize,
    sum: f64,
}

impl PowerHistory {
    /// Creates an empty window holding at most `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            sum: 0.0,
        }
    }

    /// Window length covering `seconds` of ticks of length `dt`.
    pub fn window_for(seconds: f64, dt: f64) -> usize {
        if dt > 0.0 && seconds > 0.0 {
            (seconds / dt).round().max(1.0) as usize
        } else {
            1
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changes the window length, dropping the oldest samples that no longer fit.
    pub fn resize(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.samples.len() > self.capacity {
            if let Some(old) = self.samples.pop_front() {
                self.sum -= old;
            }
        }
    }

    pub fn push(&mut self, sample: f64) {
        if self.samples.len() == self.capacity {
            if let Some(old) = self.samples.pop_front() {
                self.sum -= old;
            }
        }
        self.samples.push_back(sample);
        self.sum += sample;
    }

    /// Mean of the samples currently held, or 0 when empty.
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.sum / self.samples.len() as f64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.sum = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_average_is_zero() {
        let h = PowerHistory::new(5);
        assert_eq!(h.average(), 0.0);
        assert!(h.is_empty());
    }

    #[test]
    fn window_drops_oldest() {
        let mut h = PowerHistory::new(3);
        for s in [1.0, 2.0, 3.0, 4.0] {
            h.push(s);
        }
        assert_eq!(h.len(), 3);
        assert!((h.average() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn window_for_five_seconds() {
        assert_eq!(PowerHistory::window_for(5.0, 0.001), 5000);
        assert_eq!(PowerHistory::window_for(5.0, 1.0 / 60.0), 300);
        assert_eq!(PowerHistory::window_for(5.0, 0.0), 1);
    }

    #[test]
    fn zero_capacity_holds_one() {
        let mut h = PowerHistory::new(0);
        h.push(2.0);
        h.push(6.0);
        assert_eq!(h.average(), 6.0);
    }

    #[test]
    fn shrinking_keeps_the_newest() {
        let mut h = PowerHistory::new(4);
        for s in [1.0, 2.0, 3.0, 4.0] {
            h.push(s);
        }
        h.resize(2);
        assert_eq!(h.capacity(), 2);
        assert_eq!(h.len(), 2);
        assert!((h.average() - 3.5).abs() < 1e-12);

        h.resize(3);
        h.push(6.0);
        assert_eq!(h.len(), 3);
        assert!((h.average() - 13.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn clear_resets() {
        let mut h = PowerHistory::new(3);
        h.push(1.0);
        h.clear();
        assert_eq!(h.average(), 0.0);
    }
}
