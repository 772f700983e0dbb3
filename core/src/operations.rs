//! Top-level contact and company operations.
//!
//! Each operation resolves the property types it needs afresh, formats the
//! records against them and submits the payload through a `Transport`.
//! Nothing is retried and every failure reaches the caller unchanged.

use std::borrow::Borrow;
use std::iter;

use crate::client::HubspotClient;
use crate::error::ApiError;
use crate::formatter::ContactPropertiesData;
use crate::paginate::{paginate, BATCH_SAVING_SIZE_LIMIT};
use crate::properties::{PropertyDefinition, PropertyScope, PropertyTypeMap};
use crate::transport::Transport;
use crate::types::{Company, Contact};

/// Every property HubSpot declares for `scope`.
#[tracing::instrument(skip(transport, client))]
pub fn get_all_properties<T: Transport + ?Sized>(
    transport: &T,
    client: &HubspotClient,
    scope: PropertyScope,
) -> Result<Vec<PropertyDefinition>, ApiError> {
    let response = transport.execute(client.build_get_properties(scope))?;
    client.parse_get_properties(response)
}

pub fn resolve_property_types<T: Transport + ?Sized>(
    transport: &T,
    client: &HubspotClient,
    scope: PropertyScope,
) -> Result<PropertyTypeMap, ApiError> {
    let types: PropertyTypeMap = get_all_properties(transport, client, scope)?.into_iter().collect();
    tracing::debug!(?scope, properties = types.len(), "resolved property types");
    Ok(types)
}

/// Request the creation or update of `contacts`, at most
/// `BATCH_SAVING_SIZE_LIMIT` per request.
///
/// Only the email address and properties of each contact are sent. HubSpot
/// queues accepted batches, so success means the input was accepted rather
/// than applied. Batches are submitted in order; if one fails, the ones
/// before it stay submitted.
#[tracing::instrument(skip_all)]
pub fn save_contacts<T, C>(transport: &T, client: &HubspotClient, contacts: C) -> Result<(), ApiError>
where
    T: Transport + ?Sized,
    C: IntoIterator,
    C::Item: Borrow<Contact>,
{
    let mut batches = paginate(contacts, BATCH_SAVING_SIZE_LIMIT);
    let Some(first_batch) = batches.next() else {
        tracing::debug!("no contacts to save");
        return Ok(());
    };

    let types = resolve_property_types(transport, client, PropertyScope::Contacts)?;
    let formatter = client.formatter(&types);

    let mut saved = 0;
    for (index, batch) in iter::once(first_batch).chain(batches).enumerate() {
        let batch_data =
            formatter.format_contacts(batch.iter().map(|contact| Borrow::<Contact>::borrow(contact)))?;
        tracing::debug!(batch = index, size = batch_data.len(), "submitting contacts batch");
        let response = transport.execute(client.build_save_contacts(&batch_data)?)?;
        client.parse_save_contacts(response)?;
        saved += batch_data.len();
    }

    tracing::info!(contacts = saved, "contacts accepted for saving");
    Ok(())
}

/// Create `contact` and return the VID HubSpot assigned to it.
///
/// Any VID already set on `contact` is ignored.
#[tracing::instrument(skip_all, fields(email = %contact.email_address))]
pub fn create_contact<T: Transport + ?Sized>(
    transport: &T,
    client: &HubspotClient,
    contact: &Contact,
) -> Result<u64, ApiError> {
    let types = resolve_property_types(transport, client, PropertyScope::Contacts)?;
    let contact_data = client.formatter(&types).format_contact(contact)?;
    let response = transport.execute(client.build_create_contact(&contact_data)?)?;
    let vid = client.parse_create_contact(response)?;
    tracing::info!(vid, "contact created");
    Ok(vid)
}

/// Overwrite the properties of the existing contact identified by its VID.
#[tracing::instrument(skip_all, fields(vid = ?contact.vid))]
pub fn update_contact<T: Transport + ?Sized>(
    transport: &T,
    client: &HubspotClient,
    contact: &Contact,
) -> Result<(), ApiError> {
    let vid = contact.vid.ok_or(ApiError::MissingVid)?;
    let types = resolve_property_types(transport, client, PropertyScope::Contacts)?;
    let properties_data = ContactPropertiesData {
        properties: client.formatter(&types).format_contact_properties(&contact.properties)?,
    };
    let response = transport.execute(client.build_update_contact(vid, &properties_data)?)?;
    client.parse_update_contact(response)?;
    tracing::info!(vid, "contact updated");
    Ok(())
}

/// Create `company` and return the id HubSpot assigned to it.
#[tracing::instrument(skip_all)]
pub fn create_company<T: Transport + ?Sized>(
    transport: &T,
    client: &HubspotClient,
    company: &Company,
) -> Result<u64, ApiError> {
    let types = resolve_property_types(transport, client, PropertyScope::Companies)?;
    let company_data = client.formatter(&types).format_company(company)?;
    let response = transport.execute(client.build_create_company(&company_data)?)?;
    let company_id = client.parse_create_company(response)?;
    tracing::info!(company_id, "company created");
    Ok(company_id)
}
