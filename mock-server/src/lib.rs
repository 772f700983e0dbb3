//! In-memory stand-in for a HubSpot portal's contacts and companies APIs.
//!
//! The portal validates submitted property values against the definitions it
//! declares and answers with HubSpot-shaped error bodies, so clients can be
//! exercised end-to-end without a real account.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

const MILLIS_PER_DAY: i64 = 86_400_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyOption {
    pub label: String,
    pub value: String,
}

/// A property as the portal declares it on its metadata endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    pub name: String,
    pub label: String,
    pub group_name: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub field_type: String,
    #[serde(default)]
    pub options: Vec<PropertyOption>,
    #[serde(default)]
    pub hidden: bool,
}

impl PropertyDefinition {
    pub fn new(name: &str, property_type: &str, field_type: &str) -> Self {
        Self {
            name: name.to_string(),
            label: name.to_string(),
            group_name: "contactinformation".to_string(),
            property_type: property_type.to_string(),
            field_type: field_type.to_string(),
            options: Vec::new(),
            hidden: false,
        }
    }

    pub fn with_options(mut self, values: &[&str]) -> Self {
        self.options = values
            .iter()
            .map(|value| PropertyOption {
                label: value.to_string(),
                value: value.to_string(),
            })
            .collect();
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredContact {
    pub email: String,
    pub properties: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
pub struct ContactPropertyInput {
    pub property: String,
    pub value: Value,
}

#[derive(Deserialize)]
pub struct ContactInput {
    pub email: String,
    #[serde(default)]
    pub properties: Vec<ContactPropertyInput>,
}

#[derive(Deserialize)]
pub struct ContactProfileInput {
    pub properties: Vec<ContactPropertyInput>,
}

#[derive(Deserialize)]
pub struct CompanyPropertyInput {
    pub name: String,
    pub value: Value,
}

#[derive(Deserialize)]
pub struct CompanyInput {
    pub properties: Vec<CompanyPropertyInput>,
}

/// Everything the portal knows, plus a log of what it was asked to do.
#[derive(Debug, Default)]
pub struct PortalState {
    pub access_token: Option<String>,
    pub contact_properties: Vec<PropertyDefinition>,
    pub company_properties: Vec<PropertyDefinition>,
    pub contacts: BTreeMap<u64, StoredContact>,
    pub companies: BTreeMap<u64, BTreeMap<String, Value>>,
    /// Emails of each accepted batch submission, in arrival order.
    pub batches: Vec<Vec<String>>,
    pub property_requests: usize,
    next_id: u64,
}

impl PortalState {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn upsert_contact(&mut self, email: String, properties: BTreeMap<String, Value>) {
        let existing = self
            .contacts
            .iter_mut()
            .find(|(_, contact)| contact.email == email);
        match existing {
            Some((_, contact)) => contact.properties.extend(properties),
            None => {
                let vid = self.allocate_id();
                self.contacts.insert(vid, StoredContact { email, properties });
            }
        }
    }
}

pub type Portal = Arc<RwLock<PortalState>>;

/// A portal declaring a typical set of contact and company properties.
pub fn seeded_portal() -> Portal {
    let state = PortalState {
        contact_properties: vec![
            PropertyDefinition::new("firstname", "string", "text"),
            PropertyDefinition::new("lastname", "string", "text"),
            PropertyDefinition::new("is_polite", "bool", "booleancheckbox"),
            PropertyDefinition::new("lifecyclestage", "enumeration", "select")
                .with_options(&["subscriber", "lead", "customer"]),
            PropertyDefinition::new("birthday", "date", "date"),
            PropertyDefinition::new("lastseen", "datetime", "date"),
            PropertyDefinition::new("num_visits", "number", "number"),
        ],
        company_properties: vec![
            PropertyDefinition::new("name", "string", "text"),
            PropertyDefinition::new("domain", "string", "text"),
            PropertyDefinition::new("num_employees", "number", "number"),
            PropertyDefinition::new("is_public", "bool", "booleancheckbox"),
        ],
        ..PortalState::default()
    };
    Arc::new(RwLock::new(state))
}

pub fn app() -> Router {
    app_with_portal(seeded_portal())
}

pub fn app_with_portal(portal: Portal) -> Router {
    Router::new()
        .route("/contacts/v1/properties", get(list_contact_properties))
        .route("/companies/v2/properties", get(list_company_properties))
        .route("/contacts/v1/contact/batch/", post(save_contacts))
        .route("/contacts/v1/contact/", post(create_contact))
        .route("/contacts/v1/contact/vid/{vid}/profile", post(update_contact))
        .route("/companies/v2/companies/", post(create_company))
        .layer(middleware::from_fn_with_state(portal.clone(), require_token))
        .with_state(portal)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_portal(listener: TcpListener, portal: Portal) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_portal(portal)).await
}

pub const CORRELATION_ID_HEADER: &str = "x-hubspot-correlation-id";

/// A HubSpot-shaped error: `{"status":"error","message":..,"requestId":..}`.
/// The request id is repeated in the correlation header.
#[derive(Debug)]
pub struct PortalError {
    status: StatusCode,
    message: String,
}

impl PortalError {
    fn bad_request(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        tracing::info!(status = %self.status, message = %self.message, "rejecting request");
        let request_id = Uuid::new_v4().to_string();
        let body = json!({
            "status": "error",
            "message": self.message,
            "requestId": request_id,
        });
        (self.status, [(CORRELATION_ID_HEADER, request_id)], Json(body)).into_response()
    }
}

async fn require_token(
    State(portal): State<Portal>,
    request: Request,
    next: Next,
) -> Result<Response, PortalError> {
    let expected = portal.read().await.access_token.clone();
    if let Some(token) = expected {
        let supplied = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));
        if supplied != Some(token.as_str()) {
            return Err(PortalError {
                status: StatusCode::UNAUTHORIZED,
                message: "Authentication credentials not found.".to_string(),
            });
        }
    }
    Ok(next.run(request).await)
}

async fn list_contact_properties(State(portal): State<Portal>) -> Json<Vec<PropertyDefinition>> {
    let mut state = portal.write().await;
    state.property_requests += 1;
    Json(state.contact_properties.clone())
}

async fn list_company_properties(State(portal): State<Portal>) -> Json<Vec<PropertyDefinition>> {
    let mut state = portal.write().await;
    state.property_requests += 1;
    Json(state.company_properties.clone())
}

async fn save_contacts(
    State(portal): State<Portal>,
    Json(input): Json<Vec<ContactInput>>,
) -> Result<StatusCode, PortalError> {
    let mut state = portal.write().await;
    let mut accepted = Vec::with_capacity(input.len());
    for contact in input {
        let properties = validate_contact_properties(&state.contact_properties, contact.properties)?;
        accepted.push((contact.email, properties));
    }
    state
        .batches
        .push(accepted.iter().map(|(email, _)| email.clone()).collect());
    for (email, properties) in accepted {
        state.upsert_contact(email, properties);
    }
    Ok(StatusCode::ACCEPTED)
}

async fn create_contact(
    State(portal): State<Portal>,
    Json(input): Json<ContactInput>,
) -> Result<Json<Value>, PortalError> {
    let mut state = portal.write().await;
    let properties = validate_contact_properties(&state.contact_properties, input.properties)?;
    if state.contacts.values().any(|contact| contact.email == input.email) {
        return Err(PortalError {
            status: StatusCode::CONFLICT,
            message: "Contact already exists".to_string(),
        });
    }
    let vid = state.allocate_id();
    state.contacts.insert(
        vid,
        StoredContact {
            email: input.email,
            properties,
        },
    );
    Ok(Json(json!({ "vid": vid, "is-contact": true })))
}

async fn update_contact(
    State(portal): State<Portal>,
    Path(vid): Path<u64>,
    Json(input): Json<ContactProfileInput>,
) -> Result<StatusCode, PortalError> {
    let mut state = portal.write().await;
    let properties = validate_contact_properties(&state.contact_properties, input.properties)?;
    let contact = state.contacts.get_mut(&vid).ok_or_else(|| PortalError {
        status: StatusCode::NOT_FOUND,
        message: format!("contact does not exist: {vid}"),
    })?;
    contact.properties.extend(properties);
    Ok(StatusCode::NO_CONTENT)
}

async fn create_company(
    State(portal): State<Portal>,
    Json(input): Json<CompanyInput>,
) -> Result<Json<Value>, PortalError> {
    let mut state = portal.write().await;
    let mut properties = BTreeMap::new();
    for property in input.properties {
        validate_value(&state.company_properties, &property.name, &property.value)?;
        properties.insert(property.name, property.value);
    }
    let company_id = state.allocate_id();
    state.companies.insert(company_id, properties.clone());
    Ok(Json(json!({ "companyId": company_id, "properties": properties })))
}

fn validate_contact_properties(
    definitions: &[PropertyDefinition],
    properties: Vec<ContactPropertyInput>,
) -> Result<BTreeMap<String, Value>, PortalError> {
    let mut validated = BTreeMap::new();
    for property in properties {
        validate_value(definitions, &property.property, &property.value)?;
        validated.insert(property.property, property.value);
    }
    Ok(validated)
}

fn validate_value(
    definitions: &[PropertyDefinition],
    name: &str,
    value: &Value,
) -> Result<(), PortalError> {
    let definition = definitions
        .iter()
        .find(|definition| definition.name == name)
        .ok_or_else(|| PortalError::bad_request(format!("Property \"{name}\" does not exist")))?;

    let valid = match definition.property_type.as_str() {
        "string" => value.is_string(),
        "number" => value.is_number() || as_text(value).is_some_and(|text| text.parse::<f64>().is_ok()),
        "bool" => is_boolean_token(value),
        "enumeration" if definition.field_type == "booleancheckbox" => is_boolean_token(value),
        "enumeration" => as_text(value).is_some_and(|text| {
            text.split(';')
                .all(|token| definition.options.iter().any(|option| option.value == token))
        }),
        "date" => as_millis(value).is_some_and(|millis| millis % MILLIS_PER_DAY == 0),
        "datetime" => as_millis(value).is_some(),
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(PortalError::bad_request(format!(
            "Property {value} is not a valid {} value for \"{name}\"",
            definition.property_type
        )))
    }
}

fn as_text(value: &Value) -> Option<&str> {
    value.as_str()
}

fn is_boolean_token(value: &Value) -> bool {
    matches!(as_text(value), Some("true" | "false"))
}

fn as_millis(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| as_text(value).and_then(|text| text.parse().ok()))
}
