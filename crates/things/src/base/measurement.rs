//! Measurements: canonical values, display values and structured quantities.

use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

use crate::base::CodableValue;
use crate::error::{Result, ThingError};
use crate::units::{
    Calories, CanonicalUnit, Kilograms, Liters, LitersPerSecond, Meters, MillimolesPerLiter,
    convert_from_canonical, convert_to_canonical,
};
use crate::validation::{
    Validate, ValidationError, require_finite, require_non_negative, require_text,
    validate_each, validate_field, validate_optional, validate_optional_text,
};

/// A value as the user entered or wants to see it.
///
/// Written as `<display units="lb" units-code="lb">154</display>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayValue {
    pub value: f64,
    pub units: Option<String>,
    pub units_code: Option<String>,
    pub text: Option<String>,
}

impl DisplayValue {
    pub fn new(value: f64, units: impl Into<String>) -> Self {
        Self {
            value,
            units: Some(units.into()),
            units_code: None,
            text: None,
        }
    }

    pub fn with_units_code(mut self, code: impl Into<String>) -> Self {
        self.units_code = Some(code.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Units code if present, else the units label.
    pub fn effective_units(&self) -> Option<&str> {
        self.units_code.as_deref().or(self.units.as_deref())
    }
}

impl FromXml for DisplayValue {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            value: f64::from_xml(node)?,
            units: node.attribute("units").map(str::to_string),
            units_code: node.attribute("units-code").map(str::to_string),
            text: node.attribute("text").map(str::to_string),
        })
    }
}

impl ToXml for DisplayValue {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        if let Some(units) = &self.units {
            writer.write_attribute("units", units)?;
        }
        if let Some(code) = &self.units_code {
            writer.write_attribute("units-code", code)?;
        }
        if let Some(text) = &self.text {
            writer.write_attribute("text", text)?;
        }
        writer.write_string(&self.value.to_string())?;
        writer.end_element()
    }
}

impl Validate for DisplayValue {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        require_finite("display", self.value)?;
        validate_optional_text("units", &self.units)?;
        validate_optional_text("units-code", &self.units_code)
    }
}

/// A value held in the canonical unit of `U`, with an optional display value.
///
/// ```
/// use hvt_things::base::WeightValue;
///
/// let weight = WeightValue::from_display(154.0, "lb").unwrap();
/// assert!((weight.value - 69.853).abs() < 0.001);
/// assert_eq!(weight.display.as_ref().unwrap().value, 154.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "", rename_all = "camelCase")]
pub struct Measurement<U: CanonicalUnit> {
    /// Value in the canonical unit.
    pub value: f64,
    pub display: Option<DisplayValue>,
    #[serde(skip)]
    unit: PhantomData<U>,
}

impl<U: CanonicalUnit> Measurement<U> {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            display: None,
            unit: PhantomData,
        }
    }

    /// Builds a measurement from a value in display units.
    pub fn from_display(value: f64, units: &str) -> Result<Self> {
        let canonical =
            convert_to_canonical::<U>(units, value).ok_or_else(|| ThingError::UnknownUnits {
                units: units.to_string(),
                dimension: U::DIMENSION,
            })?;
        let display = DisplayValue::new(value, units).with_units_code(units);
        Ok(Self::new(canonical).with_display(display))
    }

    pub fn with_display(mut self, display: DisplayValue) -> Self {
        self.display = Some(display);
        self
    }

    /// The canonical value expressed in other units.
    pub fn value_in(&self, units: &str) -> Option<f64> {
        convert_from_canonical::<U>(units, self.value)
    }

    /// Element name of the canonical value.
    pub fn canonical_element() -> &'static str {
        U::ELEMENT
    }
}

impl<U: CanonicalUnit> FromXml for Measurement<U> {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            value: node.required(U::ELEMENT)?,
            display: node.optional("display")?,
            unit: PhantomData,
        })
    }
}

impl<U: CanonicalUnit> ToXml for Measurement<U> {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write(U::ELEMENT, &self.value)?;
        writer.write_optional("display", &self.display)?;
        writer.end_element()
    }
}

impl<U: CanonicalUnit> Validate for Measurement<U> {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        require_finite(U::ELEMENT, self.value)?;
        if !U::ALLOWS_NEGATIVE {
            require_non_negative(U::ELEMENT, self.value)?;
        }
        validate_optional("display", &self.display)
    }
}

pub type WeightValue = Measurement<Kilograms>;
pub type Length = Measurement<Meters>;
pub type BloodGlucoseMeasurement = Measurement<MillimolesPerLiter>;
pub type VolumeValue = Measurement<Liters>;
pub type FlowValue = Measurement<LitersPerSecond>;
pub type FoodEnergyValue = Measurement<Calories>;

/// A numeric value with coded units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredMeasurement {
    pub value: f64,
    pub units: CodableValue,
}

impl StructuredMeasurement {
    pub fn new(value: f64, units: impl Into<CodableValue>) -> Self {
        Self {
            value,
            units: units.into(),
        }
    }
}

impl FromXml for StructuredMeasurement {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            value: node.required("value")?,
            units: node.required("units")?,
        })
    }
}

impl ToXml for StructuredMeasurement {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("value", &self.value)?;
        writer.write("units", &self.units)?;
        writer.end_element()
    }
}

impl Validate for StructuredMeasurement {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        require_finite("value", self.value)?;
        validate_field("units", &self.units)
    }
}

/// A free-form measurement ("2 tablets", "10 mg") with optional
/// structured equivalents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralMeasurement {
    pub display: String,
    #[serde(default)]
    pub structured: Vec<StructuredMeasurement>,
}

impl GeneralMeasurement {
    pub fn new(display: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            structured: Vec::new(),
        }
    }

    pub fn with_structured(mut self, measurement: StructuredMeasurement) -> Self {
        self.structured.push(measurement);
        self
    }
}

impl FromXml for GeneralMeasurement {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            display: node.required_text("display")?,
            structured: node.repeated("structured")?,
        })
    }
}

impl ToXml for GeneralMeasurement {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("display", &self.display)?;
        writer.write_repeated("structured", &self.structured)?;
        writer.end_element()
    }
}

impl Validate for GeneralMeasurement {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        require_text("display", &self.display)?;
        validate_each("structured", &self.structured)
    }
}

/// An inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoubleRange {
    pub minimum: f64,
    pub maximum: f64,
}

impl DoubleRange {
    pub fn new(minimum: f64, maximum: f64) -> Self {
        Self { minimum, maximum }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.minimum && value <= self.maximum
    }
}

impl FromXml for DoubleRange {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            minimum: node.required("minimum-range")?,
            maximum: node.required("maximum-range")?,
        })
    }
}

impl ToXml for DoubleRange {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("minimum-range", &self.minimum)?;
        writer.write("maximum-range", &self.maximum)?;
        writer.end_element()
    }
}

impl Validate for DoubleRange {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        require_finite("minimum-range", self.minimum)?;
        require_finite("maximum-range", self.maximum)?;
        if self.minimum > self.maximum {
            return Err(ValidationError::invalid(
                "minimum-range",
                format!(
                    "minimum {} is greater than maximum {}",
                    self.minimum, self.maximum
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hvt_serde::{from_xml_str, to_xml_string};

    #[test]
    fn test_weight_value_round_trips_display() {
        let xml = r#"<value><kg>70</kg><display units="lb" units-code="lb">154.3</display></value>"#;
        let weight: WeightValue = from_xml_str(xml).unwrap();
        assert_eq!(weight.value, 70.0);
        let display = weight.display.as_ref().unwrap();
        assert_eq!(display.value, 154.3);
        assert_eq!(display.effective_units(), Some("lb"));
        assert_eq!(to_xml_string("value", &weight).unwrap(), xml);
    }

    #[test]
    fn test_canonical_element_comes_from_unit() {
        let glucose: BloodGlucoseMeasurement =
            from_xml_str("<value><mmolPerL>5.5</mmolPerL></value>").unwrap();
        assert_eq!(glucose.value, 5.5);
        assert_eq!(BloodGlucoseMeasurement::canonical_element(), "mmolPerL");

        let wrong = from_xml_str::<BloodGlucoseMeasurement>("<value><kg>5.5</kg></value>");
        assert!(wrong.is_err());
    }

    #[test]
    fn test_from_display_converts() {
        let height = Length::from_display(72.0, "in").unwrap();
        assert!((height.value - 1.8288).abs() < 1e-9);
        assert!((height.value_in("ft").unwrap() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_display_unknown_units() {
        let err = WeightValue::from_display(1.0, "parsec").unwrap_err();
        assert!(matches!(err, ThingError::UnknownUnits { dimension: "weight", .. }));
    }

    #[test]
    fn test_negative_weight_is_invalid() {
        let err = WeightValue::new(-1.0).validate().unwrap_err();
        assert_eq!(err.field(), "kg");
    }

    #[test]
    fn test_general_measurement() {
        let xml = "<dose><display>2 tablets</display><structured><value>2</value><units><text>tablets</text></units></structured></dose>";
        let dose: GeneralMeasurement = from_xml_str(xml).unwrap();
        assert_eq!(dose.display, "2 tablets");
        assert_eq!(dose.structured[0].value, 2.0);
        assert_eq!(to_xml_string("dose", &dose).unwrap(), xml);
    }

    #[test]
    fn test_double_range() {
        let range: DoubleRange = from_xml_str(
            "<value><minimum-range>3.5</minimum-range><maximum-range>5</maximum-range></value>",
        )
        .unwrap();
        assert!(range.contains(4.0));
        assert!(range.validate().is_ok());
        assert!(DoubleRange::new(5.0, 1.0).validate().is_err());
    }

    #[test]
    fn test_double_range_rejects_non_finite_bounds() {
        let err = DoubleRange::new(f64::NAN, 5.0).validate().unwrap_err();
        assert_eq!(err.field(), "minimum-range");
        let err = DoubleRange::new(1.0, f64::INFINITY).validate().unwrap_err();
        assert_eq!(err.field(), "maximum-range");
    }
}
