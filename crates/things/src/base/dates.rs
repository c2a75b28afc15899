//! Dates and times as the platform schema models them.
//!
//! Exact dates and times are broken into their components (`<y>`, `<m>`,
//! `<d>`, `<h>`, ...). Approximate dates may stop at the year or month, and
//! approximate date-times may instead be free text such as "when I was a
//! child".

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use hvt_serde::{FromXml, SerdeError, ToXml, XmlNode, XmlWriter};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::base::CodableValue;
use crate::validation::{
    Validate, ValidationError, require_range, require_text, validate_field, validate_optional,
};

const MIN_YEAR: i32 = 1000;
const MAX_YEAR: i32 = 9999;

fn check_day(year: i32, month: u32, day: u32) -> Result<(), ValidationError> {
    require_range("d", day, 1, 31)?;
    if NaiveDate::from_ymd_opt(year, month, day).is_none() {
        return Err(ValidationError::invalid(
            "d",
            format!("day {} does not exist in {:04}-{:02}", day, year, month),
        ));
    }
    Ok(())
}

/// A date known to the year, month or day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproximateDate {
    pub y: i32,
    pub m: Option<u32>,
    pub d: Option<u32>,
}

impl ApproximateDate {
    pub fn year(y: i32) -> Self {
        Self { y, m: None, d: None }
    }

    pub fn year_month(y: i32, m: u32) -> Self {
        Self { y, m: Some(m), d: None }
    }

    pub fn ymd(y: i32, m: u32, d: u32) -> Self {
        Self {
            y,
            m: Some(m),
            d: Some(d),
        }
    }

    pub fn is_full_date(&self) -> bool {
        self.m.is_some() && self.d.is_some()
    }

    /// First calendar day the date can refer to.
    pub fn earliest(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.y, self.m.unwrap_or(1), self.d.unwrap_or(1))
    }

    /// Orders two dates on the precision they share, so `2020` and
    /// `2020-05` compare equal.
    pub fn compare(&self, other: &ApproximateDate) -> Ordering {
        self.y
            .cmp(&other.y)
            .then_with(|| match (self.m, other.m) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => Ordering::Equal,
            })
            .then_with(|| match (self.m, other.m, self.d, other.d) {
                (Some(_), Some(_), Some(a), Some(b)) => a.cmp(&b),
                _ => Ordering::Equal,
            })
    }
}

impl FromXml for ApproximateDate {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            y: node.required("y")?,
            m: node.optional("m")?,
            d: node.optional("d")?,
        })
    }
}

impl ToXml for ApproximateDate {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("y", &self.y)?;
        writer.write_optional("m", &self.m)?;
        writer.write_optional("d", &self.d)?;
        writer.end_element()
    }
}

impl Validate for ApproximateDate {
    fn validate(&self) -> Result<(), ValidationError> {
        require_range("y", self.y, MIN_YEAR, MAX_YEAR)?;
        match (self.m, self.d) {
            (None, Some(_)) => Err(ValidationError::invalid("d", "a day requires a month")),
            (Some(m), day) => {
                require_range("m", m, 1, 12)?;
                match day {
                    Some(d) => check_day(self.y, m, d),
                    None => Ok(()),
                }
            }
            (None, None) => Ok(()),
        }
    }
}

/// An exact calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthServiceDate {
    pub y: i32,
    pub m: u32,
    pub d: u32,
}

impl HealthServiceDate {
    pub fn new(y: i32, m: u32, d: u32) -> Self {
        Self { y, m, d }
    }

    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.y, self.m, self.d)
    }
}

impl From<NaiveDate> for HealthServiceDate {
    fn from(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month(), date.day())
    }
}

impl FromXml for HealthServiceDate {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            y: node.required("y")?,
            m: node.required("m")?,
            d: node.required("d")?,
        })
    }
}

impl ToXml for HealthServiceDate {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("y", &self.y)?;
        writer.write("m", &self.m)?;
        writer.write("d", &self.d)?;
        writer.end_element()
    }
}

impl Validate for HealthServiceDate {
    fn validate(&self) -> Result<(), ValidationError> {
        require_range("y", self.y, MIN_YEAR, MAX_YEAR)?;
        require_range("m", self.m, 1, 12)?;
        check_day(self.y, self.m, self.d)
    }
}

/// A time of day, to the minute, second or millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthServiceTime {
    pub h: u32,
    pub m: u32,
    pub s: Option<u32>,
    /// Milliseconds.
    pub f: Option<u32>,
}

/// Approximate times share the exact time's shape.
pub type ApproximateTime = HealthServiceTime;

impl HealthServiceTime {
    pub fn new(h: u32, m: u32) -> Self {
        Self { h, m, s: None, f: None }
    }

    pub fn with_seconds(mut self, s: u32) -> Self {
        self.s = Some(s);
        self
    }

    pub fn with_milliseconds(mut self, f: u32) -> Self {
        self.f = Some(f);
        self
    }

    pub fn to_naive(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_milli_opt(self.h, self.m, self.s.unwrap_or(0), self.f.unwrap_or(0))
    }
}

impl From<NaiveTime> for HealthServiceTime {
    fn from(time: NaiveTime) -> Self {
        let millis = time.nanosecond() / 1_000_000;
        Self {
            h: time.hour(),
            m: time.minute(),
            s: Some(time.second()),
            f: (millis > 0).then_some(millis),
        }
    }
}

impl FromXml for HealthServiceTime {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            h: node.required("h")?,
            m: node.required("m")?,
            s: node.optional("s")?,
            f: node.optional("f")?,
        })
    }
}

impl ToXml for HealthServiceTime {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("h", &self.h)?;
        writer.write("m", &self.m)?;
        writer.write_optional("s", &self.s)?;
        writer.write_optional("f", &self.f)?;
        writer.end_element()
    }
}

impl Validate for HealthServiceTime {
    fn validate(&self) -> Result<(), ValidationError> {
        require_range("h", self.h, 0, 23)?;
        require_range("m", self.m, 0, 59)?;
        if let Some(s) = self.s {
            require_range("s", s, 0, 59)?;
        }
        match (self.s, self.f) {
            (None, Some(_)) => Err(ValidationError::invalid("f", "milliseconds require seconds")),
            (_, Some(f)) => require_range("f", f, 0, 999),
            _ => Ok(()),
        }
    }
}

/// An exact date with optional time and time zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthServiceDateTime {
    pub date: HealthServiceDate,
    pub time: Option<HealthServiceTime>,
    pub tz: Option<CodableValue>,
}

impl HealthServiceDateTime {
    pub fn new(date: HealthServiceDate) -> Self {
        Self {
            date,
            time: None,
            tz: None,
        }
    }

    pub fn with_time(mut self, time: HealthServiceTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_tz(mut self, tz: CodableValue) -> Self {
        self.tz = Some(tz);
        self
    }

    /// Local date-time; a missing time reads as midnight.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        let date = self.date.to_naive()?;
        let time = match &self.time {
            Some(time) => time.to_naive()?,
            None => NaiveTime::MIN,
        };
        Some(date.and_time(time))
    }
}

impl From<HealthServiceDate> for HealthServiceDateTime {
    fn from(date: HealthServiceDate) -> Self {
        Self::new(date)
    }
}

impl From<NaiveDateTime> for HealthServiceDateTime {
    fn from(value: NaiveDateTime) -> Self {
        Self::new(value.date().into()).with_time(value.time().into())
    }
}

impl FromXml for HealthServiceDateTime {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        Ok(Self {
            date: node.required("date")?,
            time: node.optional("time")?,
            tz: node.optional("tz")?,
        })
    }
}

impl ToXml for HealthServiceDateTime {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        writer.write("date", &self.date)?;
        writer.write_optional("time", &self.time)?;
        writer.write_optional("tz", &self.tz)?;
        writer.end_element()
    }
}

impl Validate for HealthServiceDateTime {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_field("date", &self.date)?;
        validate_optional("time", &self.time)?;
        validate_optional("tz", &self.tz)
    }
}

/// A date-time that is either structured (possibly partial) or descriptive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApproximateDateTime {
    Structured {
        date: ApproximateDate,
        time: Option<ApproximateTime>,
        tz: Option<CodableValue>,
    },
    Descriptive(String),
}

impl ApproximateDateTime {
    pub fn structured(date: ApproximateDate) -> Self {
        ApproximateDateTime::Structured {
            date,
            time: None,
            tz: None,
        }
    }

    pub fn at(date: ApproximateDate, time: ApproximateTime) -> Self {
        ApproximateDateTime::Structured {
            date,
            time: Some(time),
            tz: None,
        }
    }

    pub fn descriptive(text: impl Into<String>) -> Self {
        ApproximateDateTime::Descriptive(text.into())
    }

    pub fn date(&self) -> Option<&ApproximateDate> {
        match self {
            ApproximateDateTime::Structured { date, .. } => Some(date),
            ApproximateDateTime::Descriptive(_) => None,
        }
    }

    /// Local date-time for structured values; missing parts default to the
    /// start of the period.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        match self {
            ApproximateDateTime::Structured { date, time, .. } => {
                let time = match time {
                    Some(time) => time.to_naive()?,
                    None => NaiveTime::MIN,
                };
                Some(date.earliest()?.and_time(time))
            }
            ApproximateDateTime::Descriptive(_) => None,
        }
    }

    /// Orders two structured values by date; `None` when either is descriptive.
    pub fn compare(&self, other: &ApproximateDateTime) -> Option<Ordering> {
        let ordering = self.date()?.compare(other.date()?);
        if ordering != Ordering::Equal {
            return Some(ordering);
        }
        match (self, other) {
            (
                ApproximateDateTime::Structured { date: a_date, time: Some(a), .. },
                ApproximateDateTime::Structured { date: b_date, time: Some(b), .. },
            ) if a_date.is_full_date() && a_date == b_date => {
                Some(a.to_naive()?.cmp(&b.to_naive()?))
            }
            _ => Some(Ordering::Equal),
        }
    }
}

impl FromXml for ApproximateDateTime {
    fn from_xml(node: &XmlNode) -> hvt_serde::Result<Self> {
        match (node.child("structured"), node.child("descriptive")) {
            (Some(_), Some(_)) => Err(SerdeError::UnexpectedElement {
                expected: "structured".to_string(),
                found: "descriptive".to_string(),
            }),
            (Some(structured), None) => Ok(ApproximateDateTime::Structured {
                date: structured.required("date")?,
                time: structured.optional("time")?,
                tz: structured.optional("tz")?,
            }),
            (None, Some(descriptive)) => Ok(ApproximateDateTime::Descriptive(descriptive.text())),
            (None, None) => Err(SerdeError::MissingElement {
                parent: node.name().to_string(),
                element: "structured".to_string(),
            }),
        }
    }
}

impl ToXml for ApproximateDateTime {
    fn write_xml(&self, name: &str, writer: &mut XmlWriter) -> hvt_serde::Result<()> {
        writer.start_element(name)?;
        match self {
            ApproximateDateTime::Structured { date, time, tz } => {
                writer.start_element("structured")?;
                writer.write("date", date)?;
                writer.write_optional("time", time)?;
                writer.write_optional("tz", tz)?;
                writer.end_element()?;
            }
            ApproximateDateTime::Descriptive(text) => writer.write("descriptive", text)?,
        }
        writer.end_element()
    }
}

impl Validate for ApproximateDateTime {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            ApproximateDateTime::Structured { date, time, tz } => {
                validate_field("structured.date", date)?;
                if time.is_some() && !date.is_full_date() {
                    return Err(ValidationError::invalid(
                        "structured.time",
                        "a time requires a full date",
                    ));
                }
                validate_optional("structured.time", time)?;
                validate_optional("structured.tz", tz)
            }
            ApproximateDateTime::Descriptive(text) => require_text("descriptive", text),
        }
    }
}

/// Checks that `end` does not fall before `start` when both are structured.
pub(crate) fn require_ordered(
    field: &str,
    start: &Option<ApproximateDateTime>,
    end: &Option<ApproximateDateTime>,
) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (start, end) {
        if start.compare(end) == Some(Ordering::Greater) {
            return Err(ValidationError::invalid(field, "must not be before the start date"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hvt_serde::{from_xml_str, to_xml_string};

    #[test]
    fn test_approximate_date_precision() {
        let date: ApproximateDate = from_xml_str("<d><y>2020</y><m>5</m></d>").unwrap();
        assert_eq!(date, ApproximateDate::year_month(2020, 5));
        assert!(!date.is_full_date());
        assert_eq!(date.earliest(), NaiveDate::from_ymd_opt(2020, 5, 1));
    }

    #[test]
    fn test_approximate_date_validation() {
        assert!(ApproximateDate::ymd(2024, 2, 29).validate().is_ok());
        assert!(ApproximateDate::ymd(2023, 2, 29).validate().is_err());
        assert!(ApproximateDate::year_month(2023, 13).validate().is_err());
        assert!(ApproximateDate::year(999).validate().is_err());
        let day_without_month = ApproximateDate { y: 2020, m: None, d: Some(3) };
        assert_eq!(day_without_month.validate().unwrap_err().field(), "d");
    }

    #[test]
    fn test_compare_on_shared_precision() {
        let year = ApproximateDate::year(2020);
        let may = ApproximateDate::year_month(2020, 5);
        let june_first = ApproximateDate::ymd(2020, 6, 1);
        assert_eq!(year.compare(&may), Ordering::Equal);
        assert_eq!(may.compare(&june_first), Ordering::Less);
        assert_eq!(june_first.compare(&year), Ordering::Equal);
    }

    #[test]
    fn test_time_validation() {
        assert!(HealthServiceTime::new(23, 59).with_seconds(59).validate().is_ok());
        assert!(HealthServiceTime::new(24, 0).validate().is_err());
        assert!(HealthServiceTime::new(8, 60).validate().is_err());
        let millis_without_seconds = HealthServiceTime::new(8, 0).with_milliseconds(5);
        assert_eq!(millis_without_seconds.validate().unwrap_err().field(), "f");
    }

    #[test]
    fn test_health_service_date_time_to_naive() {
        let xml = "<when><date><y>2024</y><m>1</m><d>2</d></date><time><h>8</h><m>30</m><s>15</s></time></when>";
        let when: HealthServiceDateTime = from_xml_str(xml).unwrap();
        let naive = when.to_naive().unwrap();
        assert_eq!(naive.to_string(), "2024-01-02 08:30:15");
        assert_eq!(to_xml_string("when", &when).unwrap(), xml);
    }

    #[test]
    fn test_from_naive_date_time() {
        let naive = NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_milli_opt(5, 6, 7, 250)
            .unwrap();
        let when = HealthServiceDateTime::from(naive);
        assert_eq!(when.time.unwrap().f, Some(250));
        assert_eq!(when.to_naive(), Some(naive));
    }

    #[test]
    fn test_approximate_date_time_forms() {
        let structured: ApproximateDateTime = from_xml_str(
            "<when><structured><date><y>2019</y></date></structured></when>",
        )
        .unwrap();
        assert_eq!(structured.date(), Some(&ApproximateDate::year(2019)));

        let descriptive: ApproximateDateTime =
            from_xml_str("<when><descriptive>as a child</descriptive></when>").unwrap();
        assert_eq!(descriptive, ApproximateDateTime::descriptive("as a child"));
        assert_eq!(descriptive.to_naive(), None);
        assert_eq!(
            to_xml_string("when", &descriptive).unwrap(),
            "<when><descriptive>as a child</descriptive></when>"
        );
    }

    #[test]
    fn test_approximate_date_time_needs_exactly_one_form() {
        assert!(from_xml_str::<ApproximateDateTime>("<when/>").is_err());
        assert!(from_xml_str::<ApproximateDateTime>(
            "<when><structured><date><y>2019</y></date></structured><descriptive>x</descriptive></when>"
        )
        .is_err());
    }

    #[test]
    fn test_time_requires_full_date() {
        let value =
            ApproximateDateTime::at(ApproximateDate::year(2019), HealthServiceTime::new(1, 0));
        assert_eq!(value.validate().unwrap_err().field(), "structured.time");
    }

    #[test]
    fn test_require_ordered() {
        let start = Some(ApproximateDateTime::structured(ApproximateDate::ymd(2020, 5, 1)));
        let end = Some(ApproximateDateTime::structured(ApproximateDate::ymd(2020, 4, 1)));
        assert!(require_ordered("stop-date", &start, &end).is_err());
        assert!(require_ordered("stop-date", &end, &start).is_ok());
        let vague = Some(ApproximateDateTime::descriptive("last spring"));
        assert!(require_ordered("stop-date", &start, &vague).is_ok());
    }
}
