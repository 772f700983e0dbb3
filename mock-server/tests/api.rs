use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_portal, seeded_portal, PropertyDefinition};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- properties ---

#[tokio::test]
async fn contact_properties_are_listed() {
    let resp = app()
        .oneshot(get_request("/contacts/v1/properties"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let properties: Vec<PropertyDefinition> = body_json(resp).await;
    assert!(properties.iter().any(|p| p.name == "is_polite" && p.property_type == "bool"));
}

#[tokio::test]
async fn property_requests_are_counted() {
    let portal = seeded_portal();
    let app = app_with_portal(portal.clone());
    app.clone()
        .oneshot(get_request("/contacts/v1/properties"))
        .await
        .unwrap();
    app.oneshot(get_request("/companies/v2/properties"))
        .await
        .unwrap();

    assert_eq!(portal.read().await.property_requests, 2);
}

// --- batch save ---

#[tokio::test]
async fn batch_save_returns_202_and_records_batch() {
    let portal = seeded_portal();
    let resp = app_with_portal(portal.clone())
        .oneshot(json_request(
            "/contacts/v1/contact/batch/",
            r#"[{"email":"a@example.com","properties":[{"property":"is_polite","value":"true"}]},
                {"email":"b@example.com","properties":[]}]"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let state = portal.read().await;
    assert_eq!(state.batches, vec![vec!["a@example.com".to_string(), "b@example.com".to_string()]]);
    assert_eq!(state.contacts.len(), 2);
}

#[tokio::test]
async fn batch_with_invalid_value_is_rejected_whole() {
    let portal = seeded_portal();
    let resp = app_with_portal(portal.clone())
        .oneshot(json_request(
            "/contacts/v1/contact/batch/",
            r#"[{"email":"a@example.com","properties":[]},
                {"email":"b@example.com","properties":[{"property":"is_polite","value":"maybe"}]}]"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let state = portal.read().await;
    assert!(state.batches.is_empty());
    assert!(state.contacts.is_empty());
}

// --- create contact ---

#[tokio::test]
async fn create_contact_returns_vid() {
    let resp = app()
        .oneshot(json_request(
            "/contacts/v1/contact/",
            r#"{"email":"a@example.com","properties":[{"property":"firstname","value":"Ada"}]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["vid"], 1);
}

#[tokio::test]
async fn create_contact_with_unknown_property_returns_hubspot_error() {
    let resp = app()
        .oneshot(json_request(
            "/contacts/v1/contact/",
            r#"{"email":"a@example.com","properties":[{"property":"shoe_size","value":"9"}]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let correlation_id = resp.headers()["x-hubspot-correlation-id"].to_str().unwrap().to_string();
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Property \"shoe_size\" does not exist");
    assert_eq!(body["requestId"], correlation_id.as_str());
}

#[tokio::test]
async fn create_contact_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("/contacts/v1/contact/", r#"{"not_email":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- update contact ---

#[tokio::test]
async fn update_contact_not_found() {
    let resp = app()
        .oneshot(json_request(
            "/contacts/v1/contact/vid/99/profile",
            r#"{"properties":[]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_contact_bad_vid_returns_400() {
    let resp = app()
        .oneshot(json_request(
            "/contacts/v1/contact/vid/not-a-vid/profile",
            r#"{"properties":[]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- companies ---

#[tokio::test]
async fn create_company_returns_company_id() {
    let resp = app()
        .oneshot(json_request(
            "/companies/v2/companies/",
            r#"{"properties":[{"name":"name","value":"Acme"},{"name":"is_public","value":"false"}]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["companyId"], 1);
    assert_eq!(body["properties"]["name"], "Acme");
}

// --- auth ---

#[tokio::test]
async fn missing_token_is_rejected_when_portal_requires_one() {
    let portal = seeded_portal();
    portal.write().await.access_token = Some("pat-123".to_string());
    let app = app_with_portal(portal);

    let resp = app
        .clone()
        .oneshot(get_request("/contacts/v1/properties"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/contacts/v1/properties")
                .header(http::header::AUTHORIZATION, "Bearer pat-123")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- full contact lifecycle ---

#[tokio::test]
async fn contact_lifecycle() {
    use tower::Service;

    let portal = seeded_portal();
    let mut app = app_with_portal(portal.clone()).into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "/contacts/v1/contact/",
            r#"{"email":"a@example.com","properties":[{"property":"firstname","value":"Ada"}]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created: serde_json::Value = body_json(resp).await;
    let vid = created["vid"].as_u64().unwrap();

    // creating the same email again conflicts
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "/contacts/v1/contact/",
            r#"{"email":"a@example.com","properties":[]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // update
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            &format!("/contacts/v1/contact/vid/{vid}/profile"),
            r#"{"properties":[{"property":"lastname","value":"Lovelace"}]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let body = body_bytes(resp).await;
    assert!(body.is_empty());

    let state = portal.read().await;
    let stored = &state.contacts[&vid];
    assert_eq!(stored.properties["firstname"], "Ada");
    assert_eq!(stored.properties["lastname"], "Lovelace");
}
