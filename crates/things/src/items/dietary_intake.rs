//! Dietary intake.

use chrono::NaiveDateTime;
use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base::{ApproximateDateTime, CodableValue, FoodEnergyValue, WeightValue};
use crate::items::ItemType;
use crate::validation::{
    Validate, ValidationError, require_non_negative, validate_field, validate_optional,
};

/// One food item eaten, with its nutrients.
///
/// Nutrient masses are canonical kilograms like any other weight; a
/// 12 g serving of fat is stored as `0.012`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietaryIntake {
    pub food_item: CodableValue,
    pub serving_size: Option<CodableValue>,
    pub servings_consumed: Option<f64>,
    pub meal: Option<CodableValue>,
    pub when: Option<ApproximateDateTime>,
    pub energy: Option<FoodEnergyValue>,
    pub fat: Option<WeightValue>,
    pub protein: Option<WeightValue>,
    pub carbohydrate: Option<WeightValue>,
    pub dietary_fiber: Option<WeightValue>,
    pub sugars: Option<WeightValue>,
    pub sodium: Option<WeightValue>,
    pub cholesterol: Option<WeightValue>,
}

impl DietaryIntake {
    pub fn new(food_item: impl Into<CodableValue>) -> Self {
        Self {
            food_item: food_item.into(),
            serving_size: None,
            servings_consumed: None,
            meal: None,
            when: None,
            energy: None,
            fat: None,
            protein: None,
            carbohydrate: None,
            dietary_fiber: None,
            sugars: None,
            sodium: None,
            cholesterol: None,
        }
    }

    /// Energy multiplied by servings consumed, in kcal.
    pub fn total_energy(&self) -> Option<f64> {
        let energy = self.energy.as_ref()?.value;
        Some(energy * self.servings_consumed.unwrap_or(1.0))
    }
}

impl ItemType for DietaryIntake {
    const TYPE_ID: Uuid = Uuid::from_u128(0x089646a6_7e25_4495_ad15_3e28d4c1a71d);
    const TYPE_NAME: &'static str = "Dietary Intake";
    const ROOT_ELEMENT: &'static str = "dietary-intake";

    fn effective_date(&self) -> Option<NaiveDateTime> {
        self.when.as_ref()?.to_naive()
    }
}

impl FromXml for DietaryIntake {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            food_item: node.required("food-item")?,
            serving_size: node.optional("serving-size")?,
            servings_consumed: node.optional("servings-consumed")?,
            meal: node.optional("meal")?,
            when: node.optional("when")?,
            energy: node.optional("energy")?,
            fat: node.optional("fat")?,
            protein: node.optional("protein")?,
            carbohydrate: node.optional("carbohydrate")?,
            dietary_fiber: node.optional("dietary-fiber")?,
            sugars: node.optional("sugars")?,
            sodium: node.optional("sodium")?,
            cholesterol: node.optional("cholesterol")?,
        })
    }
}

impl ToXml for DietaryIntake {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("food-item", &self.food_item)?;
        writer.write_optional("serving-size", &self.serving_size)?;
        writer.write_optional("servings-consumed", &self.servings_consumed)?;
        writer.write_optional("meal", &self.meal)?;
        writer.write_optional("when", &self.when)?;
        writer.write_optional("energy", &self.energy)?;
        writer.write_optional("fat", &self.fat)?;
        writer.write_optional("protein", &self.protein)?;
        writer.write_optional("carbohydrate", &self.carbohydrate)?;
        writer.write_optional("dietary-fiber", &self.dietary_fiber)?;
        writer.write_optional("sugars", &self.sugars)?;
        writer.write_optional("sodium", &self.sodium)?;
        writer.write_optional("cholesterol", &self.cholesterol)?;
        writer.end_element()
    }
}

impl Validate for DietaryIntake {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("food-item", &self.food_item)?;
        validate_optional("serving-size", &self.serving_size)?;
        if let Some(servings) = self.servings_consumed {
            require_non_negative("servings-consumed", servings)?;
        }
        validate_optional("meal", &self.meal)?;
        validate_optional("when", &self.when)?;
        validate_optional("energy", &self.energy)?;
        validate_optional("fat", &self.fat)?;
        validate_optional("protein", &self.protein)?;
        validate_optional("carbohydrate", &self.carbohydrate)?;
        validate_optional("dietary-fiber", &self.dietary_fiber)?;
        validate_optional("sugars", &self.sugars)?;
        validate_optional("sodium", &self.sodium)?;
        validate_optional("cholesterol", &self.cholesterol)
    }
}
