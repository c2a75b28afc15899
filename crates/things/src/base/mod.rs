//! Value types shared by the item types.

pub mod codable;
pub mod dates;
pub mod measurement;
pub mod person;

pub use codable::{CodableValue, CodedValue};
pub use dates::{
    ApproximateDate, ApproximateDateTime, ApproximateTime, HealthServiceDate,
    HealthServiceDateTime, HealthServiceTime,
};
pub use measurement::{
    BloodGlucoseMeasurement, DisplayValue, DoubleRange, FlowValue, FoodEnergyValue,
    GeneralMeasurement, Length, Measurement, StructuredMeasurement, VolumeValue, WeightValue,
};
pub use person::{Address, ContactInfo, Email, Name, PersonItem, Phone};
