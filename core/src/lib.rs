//! Blocking client for HubSpot's contacts and companies APIs.
//!
//! # Overview
//! Local `Contact` and `Company` records are formatted against the property
//! types HubSpot declares for them, then submitted through a `Transport`.
//! `save_contacts` splits its input into batches of at most
//! `BATCH_SAVING_SIZE_LIMIT` contacts.
//!
//! # Design
//! - `HubspotClient` is stateless. Each endpoint is split into `build_*`
//!   (produces an `HttpRequest`) and `parse_*` (consumes an `HttpResponse`),
//!   so the I/O boundary is explicit.
//! - `Transport` performs the round-trip; `UreqTransport` is the blocking
//!   implementation shipped with the crate.
//! - The functions in `operations` combine the two. They re-fetch the
//!   property-type map on every call and never retry.

pub mod client;
pub mod config;
pub mod error;
pub mod formatter;
pub mod http;
pub mod operations;
pub mod paginate;
pub mod properties;
pub mod transport;
pub mod types;

pub use client::HubspotClient;
pub use config::{ClientConfig, UnknownProperties};
pub use error::ApiError;
pub use formatter::{
    CompanyData, CompanyPropertyData, ContactData, ContactPropertiesData, ContactPropertyData,
    RequestFormatter,
};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use operations::{
    create_company, create_contact, get_all_properties, resolve_property_types, save_contacts,
    update_contact,
};
pub use paginate::{paginate, Paginate, BATCH_SAVING_SIZE_LIMIT};
pub use properties::{PropertyDefinition, PropertyScope, PropertyType, PropertyTypeMap};
pub use transport::{Transport, UreqTransport};
pub use types::{Company, Contact, Properties, PropertyValue};
