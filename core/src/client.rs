//! Stateless HTTP request builder and response parser for the HubSpot
//! contacts and companies APIs.
//!
//! # Design
//! `HubspotClient` holds only connection settings and carries no mutable
//! state between calls. Each endpoint is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. A `Transport` executes the round-trip in between, keeping
//! this module deterministic and free of I/O.

use serde::{Deserialize, Serialize};

use crate::config::{ClientConfig, UnknownProperties};
use crate::error::ApiError;
use crate::formatter::{CompanyData, ContactData, ContactPropertiesData, RequestFormatter};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::properties::{parse_property_definitions, PropertyDefinition, PropertyScope, PropertyTypeMap};

pub const CONTACTS_API_SCRIPT_NAME: &str = "/contacts/v1";

const CONTACTS_SAVING_PATH: &str = "/contacts/v1/contact/batch/";
const CONTACT_CREATING_PATH: &str = "/contacts/v1/contact/";
const COMPANY_CREATING_PATH: &str = "/companies/v2/companies/";

/// Response header HubSpot uses to identify a request in support tickets.
pub const CORRELATION_ID_HEADER: &str = "x-hubspot-correlation-id";

pub fn contact_updating_path(vid: u64) -> String {
    format!("{CONTACTS_API_SCRIPT_NAME}/contact/vid/{vid}/profile")
}

#[derive(Deserialize)]
struct CreatedContact {
    vid: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedCompany {
    company_id: u64,
}

/// Synchronous, stateless client for the HubSpot contacts API.
#[derive(Debug, Clone)]
pub struct HubspotClient {
    base_url: String,
    access_token: Option<String>,
    unknown_properties: UnknownProperties,
}

impl HubspotClient {
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&ClientConfig::new(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            unknown_properties: config.unknown_properties,
        }
    }

    /// A formatter bound to `types` and this client's unknown-property policy.
    pub fn formatter<'a>(&self, types: &'a PropertyTypeMap) -> RequestFormatter<'a> {
        RequestFormatter::new(types, self.unknown_properties)
    }

    pub fn build_get_properties(&self, scope: PropertyScope) -> HttpRequest {
        self.request(HttpMethod::Get, scope.properties_path(), None)
    }

    pub fn build_save_contacts(&self, batch: &[ContactData]) -> Result<HttpRequest, ApiError> {
        self.post(CONTACTS_SAVING_PATH, batch)
    }

    pub fn build_create_contact(&self, contact: &ContactData) -> Result<HttpRequest, ApiError> {
        self.post(CONTACT_CREATING_PATH, contact)
    }

    pub fn build_update_contact(
        &self,
        vid: u64,
        properties: &ContactPropertiesData,
    ) -> Result<HttpRequest, ApiError> {
        self.post(&contact_updating_path(vid), properties)
    }

    pub fn build_create_company(&self, company: &CompanyData) -> Result<HttpRequest, ApiError> {
        self.post(COMPANY_CREATING_PATH, company)
    }

    pub fn parse_get_properties(&self, response: HttpResponse) -> Result<Vec<PropertyDefinition>, ApiError> {
        check_status(&response, 200)?;
        parse_property_definitions(&response.body)
    }

    /// HubSpot queues batch saves and answers 202 once the input is accepted.
    pub fn parse_save_contacts(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 202)
    }

    pub fn parse_create_contact(&self, response: HttpResponse) -> Result<u64, ApiError> {
        check_status(&response, 200)?;
        let created: CreatedContact = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        Ok(created.vid)
    }

    pub fn parse_update_contact(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    pub fn parse_create_company(&self, response: HttpResponse) -> Result<u64, ApiError> {
        check_status(&response, 200)?;
        let created: CreatedCompany = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        Ok(created.company_id)
    }

    fn post<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(self.request(HttpMethod::Post, path, Some(body)))
    }

    fn request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        let mut headers = Vec::new();
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = &self.access_token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        tracing::debug!(method = method.as_str(), path, "built HubSpot request");
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers,
            body,
        }
    }
}

/// Map unexpected status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if (400..500).contains(&response.status) {
        return Err(ApiError::from_client_response(
            response.status,
            &response.body,
            response.header(CORRELATION_ID_HEADER),
        ));
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
