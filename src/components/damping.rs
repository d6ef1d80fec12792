use super::types::PanelParameters;

/// Composite damping: linear + quadratic + SoC-dependent electrical load.
///
/// Stateless. The engine feeds it the state of charge from the previous
/// completed tick, which breaks the SoC → damping → power → SoC loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DampingModel {
    /// Electrical damping with a full store (N·s/m).
    pub min_electrical: f64,
    /// Electrical damping with an empty store (N·s/m).
    pub max_electrical: f64,
}

impl Default for DampingModel {
    fn default() -> Self {
        Self {
            min_electrical: 0.5,
            max_electrical: 5.5,
        }
    }
}

impl DampingModel {
    /// Creates a model; bounds are sorted and floored at zero.
    pub fn new(min_electrical: f64, max_electrical: f64) -> Self {
        let lo = min_electrical.max(0.0);
        let hi = max_electrical.max(0.0);
        Self {
            min_electrical: lo.min(hi),
            max_electrical: lo.max(hi),
        }
    }

    /// Electrical damping `c_min + (c_max - c_min)·(1 - SoC)`, clamped to `[c_min, c_max]`.
    pub fn electrical(&self, state_of_charge: f64) -> f64 {
        let soc = if state_of_charge.is_nan() {
            0.0
        } else {
            state_of_charge.clamp(0.0, 1.0)
        };
        let c = self.min_electrical + (self.max_electrical - self.min_electrical) * (1.0 - soc);
        c.clamp(self.min_electrical, self.max_electrical)
    }

    /// Total damping `c1 + c2·|ẏ| + c_elec(SoC)` (N·s/m). Never below `c1`.
    pub fn total(&self, velocity: f64, state_of_charge: f64, params: &PanelParameters) -> f64 {
        let c1 = params.linear_damping.max(0.0);
        let c2 = params.quadratic_damping.max(0.0);
        c1 + c2 * velocity.abs() + self.electrical(state_of_charge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(c1: f64, c2: f64) -> PanelParameters {
        PanelParameters {
            mass: 10.0,
            stiffness: 100_000.0,
            area: 0.5,
            linear_damping: c1,
            quadratic_damping: c2,
            max_displacement: 0.01,
        }
    }

    #[test]
    fn electrical_spans_bounds() {
        let d = DampingModel::new(0.5, 5.5);
        assert_eq!(d.electrical(0.0), 5.5);
        assert_eq!(d.electrical(1.0), 0.5);
        assert!((d.electrical(0.5) - 3.0).abs() < 1e-12);
        // out-of-range SoC is clamped
        assert_eq!(d.electrical(-3.0), 5.5);
        assert_eq!(d.electrical(7.0), 0.5);
    }

    #[test]
    fn total_adds_quadratic_term_on_speed() {
        let d = DampingModel::new(0.5, 5.5);
        let p = params(10.0, 0.5);
        let up = d.total(2.0, 1.0, &p);
        let down = d.total(-2.0, 1.0, &p);
        assert_eq!(up, down);
        assert!((up - (10.0 + 1.0 + 0.5)).abs() < 1e-12);
    }

    #[test]
    fn swapped_bounds_are_sorted() {
        let d = DampingModel::new(5.0, 1.0);
        assert_eq!(d.min_electrical, 1.0);
        assert_eq!(d.max_electrical, 5.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn total_never_below_linear(
            c1 in 0.0_f64..100.0,
            c2 in 0.0_f64..10.0,
            v in -50.0_f64..50.0,
            soc in 0.0_f64..=1.0,
            lo in 0.0_f64..5.0,
            hi in 0.0_f64..20.0,
        ) {
            let p = PanelParameters {
                mass: 1.0,
                stiffness: 1000.0,
                area: 1.0,
                linear_damping: c1,
                quadratic_damping: c2,
                max_displacement: 0.01,
            };
            let d = DampingModel::new(lo, hi);
            prop_assert!(d.total(v, soc, &p) >= c1);
        }

        #[test]
        fn electrical_non_increasing_in_soc(
            a in 0.0_f64..=1.0,
            b in 0.0_f64..=1.0,
            lo in 0.0_f64..5.0,
            hi in 0.0_f64..20.0,
        ) {
            let d = DampingModel::new(lo, hi);
            let (low_soc, high_soc) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(d.electrical(high_soc) <= d.electrical(low_soc));
        }
    }
}
