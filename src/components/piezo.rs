/// Piezoelectric transducer with its load circuit.
///
/// Voltage is proportional to strain rate; power is `η·V²/R`. The voltage cap
/// applies first, then the power cap, each independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiezoelectricConverter {
    /// Voltage per unit velocity `k_v` (V·s/m).
    pub piezo_constant: f64,
    /// Load resistance `R` (Ω).
    pub resistance: f64,
    /// Conversion efficiency `η` (0..=1).
    pub efficiency: f64,
    /// Voltage saturation (V).
    pub max_voltage: f64,
    /// Power saturation (W).
    pub max_power: f64,
}

impl Default for PiezoelectricConverter {
    fn default() -> Self {
        Self {
            piezo_constant: 25.0,
            resistance: 10_000.0,
            efficiency: 0.4,
            max_voltage: 100.0,
            max_power: 4.0,
        }
    }
}

impl PiezoelectricConverter {
    /// Returns `(voltage, power)` for a panel velocity.
    pub fn convert(&self, velocity: f64) -> (f64, f64) {
        let voltage = (self.piezo_constant * velocity.abs()).clamp(0.0, self.max_voltage.max(0.0));
        let power = if self.resistance > 0.0 {
            (self.efficiency * voltage * voltage / self.resistance).clamp(0.0, self.max_power.max(0.0))
        } else {
            0.0
        };
        (voltage, power)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn power_non_decreasing_in_speed(a in 0.0_f64..20.0, b in 0.0_f64..20.0, sign in any::<bool>()) {
            let c = PiezoelectricConverter::default();
            let (slow, fast) = if a <= b { (a, b) } else { (b, a) };
            let s = if sign { 1.0 } else { -1.0 };
            prop_assert!(c.convert(s * fast).1 >= c.convert(s * slow).1);
        }

        #[test]
        fn outputs_within_caps(v in -1e3_f64..1e3) {
            let c = PiezoelectricConverter::default();
            let (volts, watts) = c.convert(v);
            prop_assert!((0.0..=c.max_voltage).contains(&volts));
            prop_assert!((0.0..=c.max_power).contains(&watts));
        }
    }
}
