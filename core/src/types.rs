//! Local records handed to the client by the caller.
//!
//! # Design
//! Records are plain structs. The client never mutates or fabricates
//! identifiers: `Contact::vid` stays `None` until the caller stores the VID
//! returned by `create_contact`.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

/// Property name to local value. Ordered so payloads are deterministic.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A property value as held by the caller, before coercion to the wire
/// representation of its declared type.
///
/// Variants are only ever chosen by the caller; text is never reinterpreted
/// as a date or number.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Text(String),
}

impl PropertyValue {
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::Boolean(_) => "boolean",
            PropertyValue::Integer(_) => "integer",
            PropertyValue::Float(_) => "float",
            PropertyValue::Date(_) => "date",
            PropertyValue::DateTime(_) => "datetime",
            PropertyValue::Text(_) => "text",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Boolean(value) => write!(f, "{value}"),
            PropertyValue::Integer(value) => write!(f, "{value}"),
            PropertyValue::Float(value) => write!(f, "{value}"),
            PropertyValue::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            PropertyValue::DateTime(value) => write!(f, "{}", value.to_rfc3339()),
            PropertyValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Integer(value.into())
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<NaiveDate> for PropertyValue {
    fn from(value: NaiveDate) -> Self {
        PropertyValue::Date(value)
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(value: DateTime<Utc>) -> Self {
        PropertyValue::DateTime(value)
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

/// A HubSpot contact.
///
/// Only `email_address` and `properties` are ever sent; `vid` is used to
/// address updates and `related_contact_vids` is carried for the caller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contact {
    pub vid: Option<u64>,
    pub email_address: String,
    pub properties: Properties,
    pub related_contact_vids: Vec<u64>,
}

impl Contact {
    pub fn new(email_address: impl Into<String>) -> Self {
        Self {
            email_address: email_address.into(),
            ..Self::default()
        }
    }

    pub fn with_vid(mut self, vid: u64) -> Self {
        self.vid = Some(vid);
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// A HubSpot company. Companies carry no client-side identifier.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Company {
    pub properties: Properties,
}

impl Company {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_defaults_to_no_related_contacts() {
        let contact = Contact::new("a@example.com");
        assert!(contact.vid.is_none());
        assert!(contact.related_contact_vids.is_empty());
        assert!(contact.properties.is_empty());
    }

    #[test]
    fn builder_methods_collect_properties() {
        let contact = Contact::new("a@example.com")
            .with_vid(7)
            .with_property("is_polite", true)
            .with_property("firstname", "Ada");
        assert_eq!(contact.vid, Some(7));
        assert_eq!(contact.properties["is_polite"], PropertyValue::Boolean(true));
        assert_eq!(contact.properties["firstname"], PropertyValue::Text("Ada".into()));
    }

    #[test]
    fn values_display_in_their_natural_form() {
        let date = NaiveDate::from_ymd_opt(2014, 3, 1).unwrap();
        assert_eq!(PropertyValue::from(date).to_string(), "2014-03-01");
        assert_eq!(PropertyValue::from(false).to_string(), "false");
        assert_eq!(PropertyValue::from(42).to_string(), "42");
        assert_eq!(PropertyValue::from(1.5).to_string(), "1.5");
    }

    #[test]
    fn date_like_text_stays_text() {
        for text in ["2014-01-01T00:00:01Z", "2014-1-1", "+2014-01-01", "42"] {
            let value = PropertyValue::from(text);
            assert_eq!(value, PropertyValue::Text(text.to_string()));
            assert_eq!(value.to_string(), text);
        }
    }
}
