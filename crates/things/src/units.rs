//! Canonical units and display-unit conversion.
//!
//! Measurements are stored in one canonical unit per dimension (kilograms,
//! meters, mmol/L, ...) and may carry the value the user entered in their
//! own units as a display value. Each dimension is a zero-sized marker type
//! implementing [`CanonicalUnit`].

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Conversion from one display unit to the canonical unit:
/// `canonical = display * factor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConversion {
    pub code: &'static str,
    pub factor: f64,
}

const fn unit(code: &'static str, factor: f64) -> UnitConversion {
    UnitConversion { code, factor }
}

/// A physical dimension with a canonical unit.
pub trait CanonicalUnit: Debug + Clone + PartialEq + Default + 'static {
    /// Element holding the canonical value in item XML.
    const ELEMENT: &'static str;
    /// Canonical unit code.
    const CODE: &'static str;
    /// Human-readable dimension name, used in error messages.
    const DIMENSION: &'static str;
    /// Whether canonical values below zero are meaningful.
    const ALLOWS_NEGATIVE: bool = false;
    /// Known display units, the canonical one included.
    const UNITS: &'static [UnitConversion];
}

macro_rules! canonical_unit {
    (
        $(#[$doc:meta])*
        $name:ident, $element:literal, $code:literal, $dimension:literal,
        [$($units:expr),* $(,)?]
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
        pub struct $name;

        impl CanonicalUnit for $name {
            const ELEMENT: &'static str = $element;
            const CODE: &'static str = $code;
            const DIMENSION: &'static str = $dimension;
            const UNITS: &'static [UnitConversion] = &[$($units),*];
        }
    };
}

canonical_unit!(
    /// Mass, stored in kilograms.
    Kilograms, "kg", "kg", "weight",
    [
        unit("kg", 1.0),
        unit("g", 0.001),
        unit("mg", 0.000_001),
        unit("lb", 0.453_592_37),
        unit("lbs", 0.453_592_37),
        unit("oz", 0.028_349_523_125),
        unit("st", 6.350_293_18),
    ]
);

canonical_unit!(
    /// Length, stored in meters.
    Meters, "m", "m", "length",
    [
        unit("m", 1.0),
        unit("cm", 0.01),
        unit("mm", 0.001),
        unit("km", 1000.0),
        unit("in", 0.0254),
        unit("ft", 0.3048),
        unit("yd", 0.9144),
        unit("mi", 1609.344),
    ]
);

canonical_unit!(
    /// Blood glucose concentration, stored in mmol/L.
    MillimolesPerLiter, "mmolPerL", "mmol/L", "blood glucose",
    [unit("mmol/L", 1.0), unit("mg/dL", 1.0 / 18.0)]
);

canonical_unit!(
    /// Volume, stored in liters.
    Liters, "liters", "L", "volume",
    [
        unit("L", 1.0),
        unit("mL", 0.001),
        unit("fl-oz", 0.029_573_529_562_5),
        unit("gal", 3.785_411_784),
    ]
);

canonical_unit!(
    /// Flow rate, stored in liters per second.
    LitersPerSecond, "liters-per-second", "L/s", "flow",
    [unit("L/s", 1.0), unit("L/min", 1.0 / 60.0)]
);

canonical_unit!(
    /// Food energy, stored in dietary Calories (kcal).
    Calories, "calories", "kcal", "energy",
    [unit("kcal", 1.0), unit("cal", 1.0), unit("kJ", 1.0 / 4.184)]
);

/// Looks up a display unit code, ignoring ASCII case and surrounding blanks.
pub fn find_units<U: CanonicalUnit>(units: &str) -> Option<&'static UnitConversion> {
    let units = units.trim();
    U::UNITS
        .iter()
        .find(|conversion| conversion.code.eq_ignore_ascii_case(units))
}

/// Converts a value in `units` to the canonical unit of `U`.
pub fn convert_to_canonical<U: CanonicalUnit>(units: &str, value: f64) -> Option<f64> {
    find_units::<U>(units).map(|c| value * c.factor)
}

/// Converts a canonical value of `U` into `units`.
pub fn convert_from_canonical<U: CanonicalUnit>(units: &str, value: f64) -> Option<f64> {
    find_units::<U>(units).map(|c| value / c.factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_pounds_to_kilograms() {
        let kg = convert_to_canonical::<Kilograms>("lb", 154.0).unwrap();
        assert!(close(kg, 69.853_224_98));
    }

    #[test]
    fn test_units_are_case_insensitive() {
        assert!(convert_to_canonical::<Meters>("CM", 180.0).is_some());
        assert!(convert_to_canonical::<MillimolesPerLiter>(" MG/DL ", 90.0).is_some());
    }

    #[test]
    fn test_unknown_units() {
        assert_eq!(convert_to_canonical::<Kilograms>("furlong", 1.0), None);
        assert_eq!(convert_from_canonical::<Meters>("kg", 1.0), None);
    }

    #[test]
    fn test_glucose_mg_per_dl() {
        let mmol = convert_to_canonical::<MillimolesPerLiter>("mg/dL", 90.0).unwrap();
        assert!(close(mmol, 5.0));
        let mg = convert_from_canonical::<MillimolesPerLiter>("mg/dL", 5.0).unwrap();
        assert!(close(mg, 90.0));
    }

    #[test]
    fn test_canonical_unit_is_listed() {
        assert!(find_units::<Kilograms>(Kilograms::CODE).is_some());
        assert!(find_units::<Meters>(Meters::CODE).is_some());
        assert!(find_units::<MillimolesPerLiter>(MillimolesPerLiter::CODE).is_some());
        assert!(find_units::<Liters>(Liters::CODE).is_some());
        assert!(find_units::<LitersPerSecond>(LitersPerSecond::CODE).is_some());
        assert!(find_units::<Calories>(Calories::CODE).is_some());
    }

    #[test]
    fn test_kilojoules_to_calories() {
        let kcal = convert_to_canonical::<Calories>("kJ", 418.4).unwrap();
        assert!(close(kcal, 100.0));
    }
}
