//! Conversion of local records into HubSpot request payloads.
//!
//! # Design
//! Each value is coerced according to the type declared for its property:
//! booleans become the `"true"`/`"false"` tokens, dates and date-times become
//! epoch milliseconds, enumerations are checked against their options. Text
//! is passed through for every type and left for HubSpot to validate.
//! Formatting is all-or-nothing: one bad value fails the whole payload.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::config::UnknownProperties;
use crate::error::ApiError;
use crate::properties::{PropertyType, PropertyTypeMap};
use crate::types::{Company, Contact, Properties, PropertyValue};

/// `{"property": .., "value": ..}` entry used by the contacts API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactPropertyData {
    pub property: String,
    pub value: Value,
}

/// Payload for creating a contact, also used for each batch entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactData {
    pub email: String,
    pub properties: Vec<ContactPropertyData>,
}

/// Payload for updating a contact's profile. Carries no email address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactPropertiesData {
    pub properties: Vec<ContactPropertyData>,
}

/// `{"name": .., "value": ..}` entry used by the companies API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyPropertyData {
    pub name: String,
    pub value: Value,
}

/// Payload for creating a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyData {
    pub properties: Vec<CompanyPropertyData>,
}

/// Formats records against one resolved `PropertyTypeMap`.
#[derive(Debug, Clone, Copy)]
pub struct RequestFormatter<'a> {
    types: &'a PropertyTypeMap,
    unknown: UnknownProperties,
}

impl<'a> RequestFormatter<'a> {
    pub fn new(types: &'a PropertyTypeMap, unknown: UnknownProperties) -> Self {
        Self { types, unknown }
    }

    pub fn format_contacts<'c, I>(&self, contacts: I) -> Result<Vec<ContactData>, ApiError>
    where
        I: IntoIterator<Item = &'c Contact>,
    {
        contacts
            .into_iter()
            .map(|contact| self.format_contact(contact))
            .collect()
    }

    /// Email address and properties only; the VID is never sent.
    pub fn format_contact(&self, contact: &Contact) -> Result<ContactData, ApiError> {
        Ok(ContactData {
            email: contact.email_address.clone(),
            properties: self.format_contact_properties(&contact.properties)?,
        })
    }

    pub fn format_contact_properties(
        &self,
        properties: &Properties,
    ) -> Result<Vec<ContactPropertyData>, ApiError> {
        properties
            .iter()
            .map(|(name, value)| {
                Ok(ContactPropertyData {
                    property: name.clone(),
                    value: self.format_value(name, value)?,
                })
            })
            .collect()
    }

    pub fn format_company(&self, company: &Company) -> Result<CompanyData, ApiError> {
        let properties = company
            .properties
            .iter()
            .map(|(name, value)| {
                Ok(CompanyPropertyData {
                    name: name.clone(),
                    value: self.format_value(name, value)?,
                })
            })
            .collect::<Result<_, ApiError>>()?;
        Ok(CompanyData { properties })
    }

    /// Coerce one value into the wire form of its declared type.
    pub fn format_value(&self, name: &str, value: &PropertyValue) -> Result<Value, ApiError> {
        match self.types.get(name) {
            Some(property_type) => coerce(name, value, property_type),
            None => match self.unknown {
                UnknownProperties::PassThrough => Ok(Value::String(value.to_string())),
                UnknownProperties::Reject => Err(ApiError::UnknownProperty(name.to_string())),
            },
        }
    }
}

fn coerce(name: &str, value: &PropertyValue, property_type: &PropertyType) -> Result<Value, ApiError> {
    match (property_type, value) {
        (PropertyType::String, value) => Ok(Value::String(value.to_string())),

        (_, PropertyValue::Text(text)) if !matches!(property_type, PropertyType::Enumeration { .. }) => {
            Ok(Value::String(text.clone()))
        }

        (PropertyType::Number, PropertyValue::Integer(number)) => Ok(Value::from(*number)),
        (PropertyType::Number, PropertyValue::Float(number)) => Number::from_f64(*number)
            .map(Value::Number)
            .ok_or_else(|| ApiError::invalid_value(name, format!("{number} is not a finite number"))),

        (PropertyType::Boolean, PropertyValue::Boolean(flag)) => {
            Ok(Value::String(if *flag { "true" } else { "false" }.to_string()))
        }

        (PropertyType::Date, PropertyValue::Date(date)) => Ok(Value::from(date_millis(*date))),
        (PropertyType::Date, PropertyValue::DateTime(datetime)) => {
            if datetime.time() != NaiveTime::MIN {
                return Err(ApiError::invalid_value(
                    name,
                    format!("{} is not at midnight UTC", datetime.to_rfc3339()),
                ));
            }
            Ok(Value::from(datetime.timestamp_millis()))
        }

        (PropertyType::DateTime, PropertyValue::DateTime(datetime)) => {
            Ok(Value::from(datetime.timestamp_millis()))
        }
        (PropertyType::DateTime, PropertyValue::Date(date)) => Ok(Value::from(date_millis(*date))),

        (PropertyType::Enumeration { options }, value) => {
            let rendered = value.to_string();
            // An empty value clears the property.
            if rendered.is_empty() {
                return Ok(Value::String(rendered));
            }
            match rendered
                .split(';')
                .find(|token| !options.iter().any(|option| option == *token))
            {
                Some(token) => Err(ApiError::invalid_value(
                    name,
                    format!("{token:?} is not one of the allowed options"),
                )),
                None => Ok(Value::String(rendered)),
            }
        }

        (property_type, value) => Err(ApiError::invalid_value(
            name,
            format!(
                "{} value cannot be sent as {}",
                value.kind(),
                property_type.name()
            ),
        )),
    }
}

fn date_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}
