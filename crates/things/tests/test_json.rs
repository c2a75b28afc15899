use hvt_serde::{from_json_str, to_json_string, to_json_value};
use hvt_things::base::{HealthServiceDate, WeightValue};
use hvt_things::items::{Condition, Weight};
use hvt_things::{Thing, ThingData};

#[test]
fn test_thing_json_round_trip() {
    let weight = Weight::new(HealthServiceDate::new(2024, 1, 2).into(), WeightValue::new(70.0));
    let thing = Thing::new(weight);
    let json = to_json_string(&thing).unwrap();
    let back: Thing = from_json_str(&json).unwrap();
    assert_eq!(back, thing);
}

#[test]
fn test_json_field_names() {
    let value = to_json_value(&Thing::new(Condition::new("Asthma"))).unwrap();
    assert_eq!(value["data"]["type"], "condition");
    assert_eq!(value["data"]["data"]["name"]["text"], "Asthma");
    assert!(value["data"]["data"].get("onsetDate").is_some());
    assert_eq!(value["state"], "Active");
}

#[test]
fn test_unknown_item_json() {
    let node = hvt_serde::XmlNode::parse_str("<custom><x>1</x></custom>").unwrap();
    let data = ThingData::parse(uuid::Uuid::from_u128(9), &node).unwrap();
    let json = to_json_string(&data).unwrap();
    let back: ThingData = from_json_str(&json).unwrap();
    assert_eq!(back, data);
}
