//! Property definitions and the name-to-type map used by the formatter.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::ApiError;

/// Which kind of record a set of property definitions describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyScope {
    Contacts,
    Companies,
}

impl PropertyScope {
    /// Metadata endpoint enumerating the scope's declared properties.
    pub fn properties_path(self) -> &'static str {
        match self {
            PropertyScope::Contacts => "/contacts/v1/properties",
            PropertyScope::Companies => "/companies/v2/properties",
        }
    }
}

/// The value type HubSpot declares for a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyType {
    String,
    Number,
    Boolean,
    Date,
    DateTime,
    Enumeration { options: Vec<String> },
}

impl PropertyType {
    pub fn name(&self) -> &'static str {
        match self {
            PropertyType::String => "string",
            PropertyType::Number => "number",
            PropertyType::Boolean => "bool",
            PropertyType::Date => "date",
            PropertyType::DateTime => "datetime",
            PropertyType::Enumeration { .. } => "enumeration",
        }
    }
}

/// One entry of the metadata endpoint's response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDefinition {
    pub name: String,
    pub label: String,
    pub group_name: Option<String>,
    pub property_type: PropertyType,
    pub field_type: Option<String>,
    pub hidden: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPropertyDefinition {
    name: String,
    #[serde(default)]
    label: String,
    group_name: Option<String>,
    #[serde(rename = "type")]
    type_name: String,
    field_type: Option<String>,
    #[serde(default)]
    options: Vec<RawOption>,
    #[serde(default)]
    hidden: bool,
}

#[derive(Deserialize)]
struct RawOption {
    value: String,
}

impl TryFrom<RawPropertyDefinition> for PropertyDefinition {
    type Error = ApiError;

    fn try_from(raw: RawPropertyDefinition) -> Result<Self, Self::Error> {
        let property_type = match raw.type_name.as_str() {
            "string" => PropertyType::String,
            "number" => PropertyType::Number,
            "bool" => PropertyType::Boolean,
            "date" => PropertyType::Date,
            "datetime" => PropertyType::DateTime,
            // Checkboxes are declared as enumerations but take boolean tokens.
            "enumeration" if raw.field_type.as_deref() == Some("booleancheckbox") => {
                PropertyType::Boolean
            }
            "enumeration" => PropertyType::Enumeration {
                options: raw.options.into_iter().map(|option| option.value).collect(),
            },
            other => {
                return Err(ApiError::DeserializationError(format!(
                    "property {:?} has unsupported type {other:?}",
                    raw.name
                )))
            }
        };
        Ok(Self {
            name: raw.name,
            label: raw.label,
            group_name: raw.group_name,
            property_type,
            field_type: raw.field_type,
            hidden: raw.hidden,
        })
    }
}

/// Parse the JSON array returned by a properties endpoint.
pub fn parse_property_definitions(body: &str) -> Result<Vec<PropertyDefinition>, ApiError> {
    let raw: Vec<RawPropertyDefinition> =
        serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))?;
    raw.into_iter().map(PropertyDefinition::try_from).collect()
}

/// Property name to declared type for one scope.
///
/// Built fresh for every top-level operation and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyTypeMap {
    types: HashMap<String, PropertyType>,
}

impl PropertyTypeMap {
    pub fn get(&self, name: &str) -> Option<&PropertyType> {
        self.types.get(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<PropertyDefinition> for PropertyTypeMap {
    fn from_iter<I: IntoIterator<Item = PropertyDefinition>>(iter: I) -> Self {
        Self {
            types: iter
                .into_iter()
                .map(|definition| (definition.name, definition.property_type))
                .collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<(S, PropertyType)> for PropertyTypeMap {
    fn from_iter<I: IntoIterator<Item = (S, PropertyType)>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().map(|(name, ty)| (name.into(), ty)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROPERTIES: &str = r#"[
        {"name":"firstname","label":"First Name","groupName":"contactinformation","type":"string","fieldType":"text","options":[]},
        {"name":"is_polite","label":"Polite?","type":"bool","fieldType":"booleancheckbox"},
        {"name":"newsletter","label":"Newsletter","type":"enumeration","fieldType":"booleancheckbox","options":[{"label":"Yes","value":"true"},{"label":"No","value":"false"}]},
        {"name":"lifecyclestage","label":"Stage","type":"enumeration","fieldType":"select","options":[{"label":"Lead","value":"lead"},{"label":"Customer","value":"customer"}]},
        {"name":"birthday","label":"Birthday","type":"date","hidden":true},
        {"name":"lastmodifieddate","label":"Last Modified","type":"datetime"},
        {"name":"num_employees","label":"Employees","type":"number"}
    ]"#;

    #[test]
    fn parses_every_declared_type() {
        let definitions = parse_property_definitions(PROPERTIES).unwrap();
        let map: PropertyTypeMap = definitions.into_iter().collect();
        assert_eq!(map.len(), 7);
        assert_eq!(map.get("firstname"), Some(&PropertyType::String));
        assert_eq!(map.get("is_polite"), Some(&PropertyType::Boolean));
        assert_eq!(map.get("birthday"), Some(&PropertyType::Date));
        assert_eq!(map.get("lastmodifieddate"), Some(&PropertyType::DateTime));
        assert_eq!(map.get("num_employees"), Some(&PropertyType::Number));
        assert_eq!(
            map.get("lifecyclestage"),
            Some(&PropertyType::Enumeration {
                options: vec!["lead".to_string(), "customer".to_string()]
            })
        );
    }

    #[test]
    fn boolean_checkbox_enumeration_is_boolean() {
        let definitions = parse_property_definitions(PROPERTIES).unwrap();
        let newsletter = definitions.iter().find(|d| d.name == "newsletter").unwrap();
        assert_eq!(newsletter.property_type, PropertyType::Boolean);
    }

    #[test]
    fn keeps_definition_metadata() {
        let definitions = parse_property_definitions(PROPERTIES).unwrap();
        let firstname = &definitions[0];
        assert_eq!(firstname.label, "First Name");
        assert_eq!(firstname.group_name.as_deref(), Some("contactinformation"));
        assert_eq!(firstname.field_type.as_deref(), Some("text"));
        assert!(definitions.iter().find(|d| d.name == "birthday").unwrap().hidden);
    }

    #[test]
    fn unsupported_type_is_rejected() {
        let err = parse_property_definitions(r#"[{"name":"x","type":"phone_number"}]"#).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(ref msg) if msg.contains("phone_number")));
    }

    #[test]
    fn bad_json_is_deserialization_error() {
        let err = parse_property_definitions("not json").unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn scopes_use_their_own_endpoints() {
        assert_eq!(PropertyScope::Contacts.properties_path(), "/contacts/v1/properties");
        assert_eq!(PropertyScope::Companies.properties_path(), "/companies/v2/properties");
    }
}
