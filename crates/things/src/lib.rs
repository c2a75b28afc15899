//! # hvt-things
//!
//! Typed health-record items ("things"): vitals, conditions, medications,
//! lab results, dietary intake, goals and more. Each item type validates its
//! own field constraints and converts to and from the platform's canonical
//! XML fragment through [`hvt_serde`]'s navigator and writer.
//!
//! Reading runs structural parsing followed by [`Validate`]; writing
//! validates first and refuses to emit invalid data.
//!
//! ```
//! use hvt_things::items::{ItemType, Weight};
//!
//! let xml = "<weight><when><date><y>2024</y><m>1</m><d>2</d></date></when>\
//!            <value><kg>70</kg></value></weight>";
//! let weight = Weight::from_item_xml(xml).unwrap();
//! assert_eq!(weight.value.value, 70.0);
//! assert_eq!(weight.to_item_xml().unwrap(), xml);
//! ```

pub mod base;
pub mod error;
pub mod items;
pub mod registry;
pub mod thing;
pub mod units;
pub mod validation;

pub use error::{Result, ThingError};
pub use items::ItemType;
pub use registry::{RegisteredType, ThingData, find_type, registered_type, registered_types};
pub use thing::{CommonItemData, Thing, ThingKey, ThingRelationship, ThingState, parse_things};
pub use validation::{Validate, ValidationError};
