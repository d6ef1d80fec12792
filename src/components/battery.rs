/// Shared energy store fed by every panel in the fleet.
///
/// `BatteryStore` has a single owner (the engine). Panel contributions for a
/// tick are summed first and applied in one [`BatteryStore::accumulate`]
/// call, together with the store's constant discharge.
///
/// # Examples
///
/// ```
/// use piezo_window_sim::components::BatteryStore;
///
/// let mut store = BatteryStore::new(50_000.0, 0.0, 0.0);
/// store.accumulate(2.5, 1.0);
/// assert_eq!(store.energy(), 2.5);
/// assert_eq!(store.state_of_charge(), 2.5 / 50_000.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryStore {
    /// Stored energy `E` (J), always within `[0, capacity]`.
    energy_j: f64,
    /// Capacity `E_max` (J).
    capacity_j: f64,
    /// Constant load on the store (W).
    discharge_w: f64,
}

impl BatteryStore {
    /// Creates a store.
    ///
    /// # Arguments
    ///
    /// * `capacity_j` - Energy capacity in joules (must be > 0)
    /// * `initial_energy_j` - Starting energy, clamped into `[0, capacity_j]`
    /// * `discharge_w` - Constant discharge in watts (must be >= 0)
    ///
    /// # Panics
    ///
    /// Panics if capacity is not positive or discharge is negative.
    pub fn new(capacity_j: f64, initial_energy_j: f64, discharge_w: f64) -> Self {
        assert!(capacity_j > 0.0 && capacity_j.is_finite());
        assert!(discharge_w >= 0.0);
        Self {
            energy_j: initial_energy_j.clamp(0.0, capacity_j),
            capacity_j,
            discharge_w,
        }
    }

    /// Applies one tick: `E ← clamp(E + (P_in − P_discharge)·Δt, 0, E_max)`.
    ///
    /// # Arguments
    ///
    /// * `generated_w` - Sum of all panels' delivered power for this tick (W)
    /// * `dt` - Tick length (s)
    ///
    /// # Returns
    ///
    /// The net energy change actually applied (J) after clamping.
    pub fn accumulate(&mut self, generated_w: f64, dt: f64) -> f64 {
        let before = self.energy_j;
        let delta = (generated_w - self.discharge_w) * dt;
        if delta.is_finite() {
            self.energy_j = (self.energy_j + delta).clamp(0.0, self.capacity_j);
        }
        self.energy_j - before
    }

    /// Fraction of capacity currently stored, in `[0, 1]`.
    pub fn state_of_charge(&self) -> f64 {
        self.energy_j / self.capacity_j
    }

    pub fn energy(&self) -> f64 {
        self.energy_j
    }

    pub fn capacity(&self) -> f64 {
        self.capacity_j
    }

    pub fn discharge(&self) -> f64 {
        self.discharge_w
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn energy_stays_within_bounds(
            capacity in 1.0_f64..1e6,
            initial in 0.0_f64..1.0,
            discharge in 0.0_f64..100.0,
            ticks in prop::collection::vec((0.0_f64..500.0, 1e-4_f64..1.0), 1..100),
        ) {
            let mut store = BatteryStore::new(capacity, initial * capacity, discharge);
            for (power, dt) in ticks {
                store.accumulate(power, dt);
                prop_assert!(store.energy() >= 0.0);
                prop_assert!(store.energy() <= store.capacity());
                prop_assert!((0.0..=1.0).contains(&store.state_of_charge()));
            }
        }
    }
}
