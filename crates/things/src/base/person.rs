//! People and their contact details.

use hvt_serde::{FromXml, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};

use crate::base::CodableValue;
use crate::validation::{
    Validate, ValidationError, require_non_empty, require_text, validate_each, validate_field,
    validate_optional, validate_optional_text,
};

/// A person's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    pub full: String,
    pub title: Option<CodableValue>,
    pub first: Option<String>,
    pub middle: Option<String>,
    pub last: Option<String>,
    pub suffix: Option<CodableValue>,
}

impl Name {
    pub fn new(full: impl Into<String>) -> Self {
        Self {
            full: full.into(),
            title: None,
            first: None,
            middle: None,
            last: None,
            suffix: None,
        }
    }

    /// Full name built from first and last.
    pub fn from_parts(first: impl Into<String>, last: impl Into<String>) -> Self {
        let first = first.into();
        let last = last.into();
        Self {
            full: format!("{} {}", first, last),
            first: Some(first),
            last: Some(last),
            ..Self::new("")
        }
    }
}

impl FromXml for Name {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            full: node.required_text("full")?,
            title: node.optional("title")?,
            first: node.optional_text("first"),
            middle: node.optional_text("middle"),
            last: node.optional_text("last"),
            suffix: node.optional("suffix")?,
        })
    }
}

impl ToXml for Name {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("full", &self.full)?;
        writer.write_optional("title", &self.title)?;
        writer.write_optional("first", &self.first)?;
        writer.write_optional("middle", &self.middle)?;
        writer.write_optional("last", &self.last)?;
        writer.write_optional("suffix", &self.suffix)?;
        writer.end_element()
    }
}

impl Validate for Name {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("full", &self.full)?;
        validate_optional("title", &self.title)?;
        validate_optional_text("first", &self.first)?;
        validate_optional_text("middle", &self.middle)?;
        validate_optional_text("last", &self.last)?;
        validate_optional("suffix", &self.suffix)
    }
}

/// A postal address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub description: Option<String>,
    pub is_primary: Option<bool>,
    pub street: Vec<String>,
    pub city: String,
    pub state: Option<String>,
    pub postcode: String,
    pub country: String,
    pub county: Option<String>,
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        postcode: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            description: None,
            is_primary: None,
            street: vec![street.into()],
            city: city.into(),
            state: None,
            postcode: postcode.into(),
            country: country.into(),
            county: None,
        }
    }
}

impl FromXml for Address {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            description: node.optional_text("description"),
            is_primary: node.optional("is-primary")?,
            street: node.repeated("street")?,
            city: node.required_text("city")?,
            state: node.optional_text("state"),
            postcode: node.required_text("postcode")?,
            country: node.required_text("country")?,
            county: node.optional_text("county"),
        })
    }
}

impl ToXml for Address {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write_optional("description", &self.description)?;
        writer.write_optional("is-primary", &self.is_primary)?;
        writer.write_repeated("street", &self.street)?;
        writer.write("city", &self.city)?;
        writer.write_optional("state", &self.state)?;
        writer.write("postcode", &self.postcode)?;
        writer.write("country", &self.country)?;
        writer.write_optional("county", &self.county)?;
        writer.end_element()
    }
}

impl Validate for Address {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_optional_text("description", &self.description)?;
        require_non_empty("street", &self.street)?;
        for (index, street) in self.street.iter().enumerate() {
            require_text(&format!("street[{}]", index), street)?;
        }
        require_text("city", &self.city)?;
        validate_optional_text("state", &self.state)?;
        require_text("postcode", &self.postcode)?;
        require_text("country", &self.country)?;
        validate_optional_text("county", &self.county)
    }
}

/// A telephone number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phone {
    pub description: Option<String>,
    pub is_primary: Option<bool>,
    pub number: String,
}

impl Phone {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            description: None,
            is_primary: None,
            number: number.into(),
        }
    }
}

impl FromXml for Phone {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            description: node.optional_text("description"),
            is_primary: node.optional("is-primary")?,
            number: node.required_text("number")?,
        })
    }
}

impl ToXml for Phone {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write_optional("description", &self.description)?;
        writer.write_optional("is-primary", &self.is_primary)?;
        writer.write("number", &self.number)?;
        writer.end_element()
    }
}

impl Validate for Phone {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_optional_text("description", &self.description)?;
        require_text("number", &self.number)
    }
}

/// An email address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    pub description: Option<String>,
    pub is_primary: Option<bool>,
    pub address: String,
}

impl Email {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            description: None,
            is_primary: None,
            address: address.into(),
        }
    }
}

impl FromXml for Email {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            description: node.optional_text("description"),
            is_primary: node.optional("is-primary")?,
            address: node.required_text("address")?,
        })
    }
}

impl ToXml for Email {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write_optional("description", &self.description)?;
        writer.write_optional("is-primary", &self.is_primary)?;
        writer.write("address", &self.address)?;
        writer.end_element()
    }
}

impl Validate for Email {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_optional_text("description", &self.description)?;
        require_text("address", &self.address)?;
        if !self.address.contains('@') {
            return Err(ValidationError::invalid("address", "is not an email address"));
        }
        Ok(())
    }
}

/// Addresses, phone numbers and email addresses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(default)]
    pub address: Vec<Address>,
    #[serde(default)]
    pub phone: Vec<Phone>,
    #[serde(default)]
    pub email: Vec<Email>,
}

fn single_primary<'a>(
    field: &str,
    flags: impl Iterator<Item = &'a Option<bool>>,
) -> Result<(), ValidationError> {
    if flags.filter(|flag| **flag == Some(true)).count() > 1 {
        return Err(ValidationError::invalid(field, "only one entry may be primary"));
    }
    Ok(())
}

impl FromXml for ContactInfo {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            address: node.repeated("address")?,
            phone: node.repeated("phone")?,
            email: node.repeated("email")?,
        })
    }
}

impl ToXml for ContactInfo {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write_repeated("address", &self.address)?;
        writer.write_repeated("phone", &self.phone)?;
        writer.write_repeated("email", &self.email)?;
        writer.end_element()
    }
}

impl Validate for ContactInfo {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_each("address", &self.address)?;
        validate_each("phone", &self.phone)?;
        validate_each("email", &self.email)?;
        single_primary("address", self.address.iter().map(|a| &a.is_primary))?;
        single_primary("phone", self.phone.iter().map(|p| &p.is_primary))?;
        single_primary("email", self.email.iter().map(|e| &e.is_primary))
    }
}

/// A person or organization: a provider, prescriber, lab and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonItem {
    pub name: Name,
    pub organization: Option<String>,
    pub professional_training: Option<String>,
    pub id: Option<String>,
    pub contact: Option<ContactInfo>,
    /// Written as `<type>`.
    pub person_type: Option<CodableValue>,
}

impl PersonItem {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            organization: None,
            professional_training: None,
            id: None,
            contact: None,
            person_type: None,
        }
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_contact(mut self, contact: ContactInfo) -> Self {
        self.contact = Some(contact);
        self
    }
}

impl FromXml for PersonItem {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            name: node.required("name")?,
            organization: node.optional_text("organization"),
            professional_training: node.optional_text("professional-training"),
            id: node.optional_text("id"),
            contact: node.optional("contact")?,
            person_type: node.optional("type")?,
        })
    }
}

impl ToXml for PersonItem {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("name", &self.name)?;
        writer.write_optional("organization", &self.organization)?;
        writer.write_optional("professional-training", &self.professional_training)?;
        writer.write_optional("id", &self.id)?;
        writer.write_optional("contact", &self.contact)?;
        writer.write_optional("type", &self.person_type)?;
        writer.end_element()
    }
}

impl Validate for PersonItem {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("name", &self.name)?;
        validate_optional_text("organization", &self.organization)?;
        validate_optional_text("professional-training", &self.professional_training)?;
        validate_optional_text("id", &self.id)?;
        validate_optional("contact", &self.contact)?;
        validate_optional("type", &self.person_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hvt_serde::{from_xml_str, to_xml_string};

    const DOCTOR: &str = "<prescribed-by><name><full>Dr. Ana Ruiz</full><first>Ana</first><last>Ruiz</last></name>\
        <organization>City Clinic</organization>\
        <contact><address><is-primary>true</is-primary><street>1 Main St</street><street>Suite 4</street>\
        <city>Springfield</city><postcode>12345</postcode><country>US</country></address>\
        <phone><number>555-0100</number></phone><email><address>ana@clinic.example</address></email></contact>\
        <type><text>Physician</text></type></prescribed-by>";

    #[test]
    fn test_parse_person() {
        let person: PersonItem = from_xml_str(DOCTOR).unwrap();
        assert_eq!(person.name.full, "Dr. Ana Ruiz");
        let contact = person.contact.as_ref().unwrap();
        assert_eq!(contact.address[0].street, vec!["1 Main St", "Suite 4"]);
        assert_eq!(contact.address[0].is_primary, Some(true));
        assert_eq!(person.person_type.as_ref().unwrap().text, "Physician");
        assert!(person.validate().is_ok());
        assert_eq!(to_xml_string("prescribed-by", &person).unwrap(), DOCTOR);
    }

    #[test]
    fn test_name_from_parts() {
        let name = Name::from_parts("Ana", "Ruiz");
        assert_eq!(name.full, "Ana Ruiz");
        assert_eq!(name.last.as_deref(), Some("Ruiz"));
    }

    #[test]
    fn test_address_needs_a_street() {
        let mut address = Address::new("1 Main St", "Springfield", "12345", "US");
        address.street.clear();
        assert_eq!(address.validate().unwrap_err().field(), "street");
    }

    #[test]
    fn test_only_one_primary_phone() {
        let mut first = Phone::new("555-0100");
        first.is_primary = Some(true);
        let mut second = Phone::new("555-0101");
        second.is_primary = Some(true);
        let contact = ContactInfo {
            phone: vec![first, second],
            ..ContactInfo::default()
        };
        assert_eq!(contact.validate().unwrap_err().field(), "phone");
    }

    #[test]
    fn test_nested_error_path() {
        let person = PersonItem::new(Name::new("Ana"))
            .with_contact(ContactInfo {
                email: vec![Email::new("not-an-email")],
                ..ContactInfo::default()
            });
        assert_eq!(person.validate().unwrap_err().field(), "contact.email[0].address");
    }
}
