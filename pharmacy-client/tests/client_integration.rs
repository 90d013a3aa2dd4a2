// pharmacy-client/tests/client_integration.rs
// End-to-end flows against a mock pharmacy API

use std::time::Duration;

use httpmock::Method::PATCH;
use httpmock::prelude::*;
use jsonwebtoken::{EncodingKey, Header, encode};
use pharmacy_client::{
    ClientConfig, ClientError, FileStorage, MemoryStorage, PharmacyClient, PolicyError,
    QuantityUpdate, RegisterRequest, Registration,
};
use serde::Serialize;
use serde_json::json;
use shared::{Cart, Role};
use tempfile::TempDir;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Claims<'a> {
    sub: &'a str,
    email: &'a str,
    first_name: &'a str,
    roles: &'a [&'a str],
    exp: i64,
}

fn mint_token(sub: &str, email: &str, roles: &[&str]) -> String {
    let claims = Claims {
        sub,
        email,
        first_name: "Token",
        roles,
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"not-verified-by-the-client"),
    )
    .unwrap()
}

fn profile(id: i64, roles: &[&str]) -> serde_json::Value {
    json!({
        "id": id,
        "firstName": "Ana",
        "lastName": "Ruiz",
        "address": "Calle Mayor 1",
        "age": 34,
        "email": "ana@example.com",
        "phoneNumber": "+34600000000",
        "roles": roles,
        "active": true,
        "createdAt": "2024-03-01T10:00:00",
        "updatedAt": "2024-03-01T10:00:00"
    })
}

fn cart_json() -> serde_json::Value {
    json!({
        "id": 4,
        "userId": 7,
        "itemList": [
            {"id": 40, "quantity": 8,
             "medicine": {"id": 100, "name": "Aspirin", "price": 3.25, "stockQuantity": 10}}
        ]
    })
}

fn memory_client(server: &MockServer) -> PharmacyClient<MemoryStorage> {
    let config = ClientConfig::new(server.url("/api")).with_timeout(5);
    PharmacyClient::with_storage(config, MemoryStorage::new()).unwrap()
}

async fn login_as(server: &MockServer, client: &mut PharmacyClient<MemoryStorage>, roles: &[&str]) {
    let token = mint_token("7", "ana@example.com", roles);
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/login");
            then.status(200).json_body(json!({ "token": token }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/users/profile");
            then.status(200).json_body(profile(7, roles));
        })
        .await;
    client.login("ana@example.com", "Secret#123").await.unwrap();
}

#[tokio::test]
async fn test_login_falls_back_to_token_claims_when_profile_fails() {
    let server = MockServer::start_async().await;
    let token = mint_token("42", "eva@example.com", &["PHARMACIST"]);

    let login = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/login")
                .json_body(json!({"email": "eva@example.com", "password": "Secret#123"}));
            then.status(200).json_body(json!({ "token": token }));
        })
        .await;
    let profile = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/users/profile")
                .header("authorization", format!("Bearer {token}"));
            then.status(500).json_body(json!({"message": "profile service down"}));
        })
        .await;

    let mut client = memory_client(&server);
    let user = client.login("eva@example.com", "Secret#123").await.unwrap();

    login.assert_async().await;
    profile.assert_async().await;
    assert_eq!(user.id, 42);
    assert_eq!(user.email, "eva@example.com");
    assert_eq!(user.first_name, "Token");
    assert_eq!(user.roles, vec![Role::Pharmacist]);
    assert_eq!(client.session().unwrap().token, token);
    assert_eq!(client.landing_path(), "/pharmacist/dashboard");
}

#[tokio::test]
async fn test_login_uses_profile_when_available() {
    let server = MockServer::start_async().await;
    let mut client = memory_client(&server);
    login_as(&server, &mut client, &["USER"]).await;

    let user = client.user().unwrap();
    assert_eq!(user.first_name, "Ana");
    assert_eq!(user.roles, vec![Role::User]);
    assert!(client.can_use_cart());
}

#[tokio::test]
async fn test_login_failure_messages() {
    let server = MockServer::start_async().await;
    let with_message = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/login");
            then.status(401).json_body(json!({"message": "Invalid email or password"}));
        })
        .await;

    let mut client = memory_client(&server);
    let err = client.login("ana@example.com", "wrong").await.unwrap_err();
    assert!(matches!(&err, ClientError::Auth(m) if m == "Invalid email or password"));
    assert!(!client.is_authenticated());

    with_message.delete_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/login");
            then.status(401).body("");
        })
        .await;
    let err = client.login("ana@example.com", "wrong").await.unwrap_err();
    assert_eq!(err.user_message(), "Login failed");
}

#[tokio::test]
async fn test_login_without_token_fails() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/login");
            then.status(200).json_body(json!({}));
        })
        .await;

    let mut client = memory_client(&server);
    let err = client.login("ana@example.com", "Secret#123").await.unwrap_err();
    assert_eq!(err.user_message(), "Login failed");
}

#[tokio::test]
async fn test_pharmacist_add_to_cart_issues_no_cart_request() {
    let server = MockServer::start_async().await;
    let mut client = memory_client(&server);
    login_as(&server, &mut client, &["PHARMACIST"]).await;

    let add = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/carts/items");
            then.status(200).json_body(cart_json());
        })
        .await;

    let cart: Cart = serde_json::from_value(cart_json()).unwrap();
    let medicine = cart.item_list[0].medicine.clone();
    let err = client.cart().add_medicine(&cart, &medicine, 1).await.unwrap_err();

    assert!(err.is_policy());
    assert_eq!(
        err.user_message(),
        "Only users can use cart functionality. Please use your pharmacist dashboard to manage inventory."
    );
    assert_eq!(add.hits_async().await, 0);
}

#[tokio::test]
async fn test_add_to_cart_clamps_to_stock_before_sending() {
    let server = MockServer::start_async().await;
    let mut client = memory_client(&server);
    login_as(&server, &mut client, &["USER"]).await;

    let add = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/carts/items")
                .json_body(json!({"cartId": 4, "medicineId": 100, "quantity": 2}));
            then.status(200).json_body(cart_json());
        })
        .await;

    let cart: Cart = serde_json::from_value(cart_json()).unwrap();
    let medicine = cart.item_list[0].medicine.clone();
    let addition = client.cart().add_medicine(&cart, &medicine, 5).await.unwrap();

    add.assert_async().await;
    assert_eq!(addition.added, 2);
    assert!(addition.clamped);
}

#[tokio::test]
async fn test_stale_stock_rejection_is_surfaced_verbatim() {
    let server = MockServer::start_async().await;
    let mut client = memory_client(&server);
    login_as(&server, &mut client, &["USER"]).await;

    let add = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/carts/items");
            then.status(409).json_body(json!({"message": "Insufficient stock for Aspirin"}));
        })
        .await;

    let cart: Cart = serde_json::from_value(json!({"id": 4, "userId": 7})).unwrap();
    let medicine: shared::Medicine = serde_json::from_value(
        json!({"id": 100, "name": "Aspirin", "price": 3.25, "stockQuantity": 10}),
    )
    .unwrap();
    let err = client.cart().add_medicine(&cart, &medicine, 3).await.unwrap_err();

    assert_eq!(add.hits_async().await, 1);
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.user_message(), "Insufficient stock for Aspirin");
}

#[tokio::test]
async fn test_get_or_create_creates_missing_cart() {
    let server = MockServer::start_async().await;
    let mut client = memory_client(&server);
    login_as(&server, &mut client, &["USER"]).await;

    let fetch = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/carts/user/7");
            then.status(404);
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/carts/user/7");
            then.status(200).json_body(json!({"id": 9, "userId": 7, "itemList": []}));
        })
        .await;

    let cart = client.cart().get_or_create().await.unwrap();
    fetch.assert_async().await;
    create.assert_async().await;
    assert_eq!(cart.id, 9);
    assert!(cart.is_empty());
}

#[tokio::test]
async fn test_older_quantity_response_is_superseded() {
    let server = MockServer::start_async().await;
    let mut client = memory_client(&server);
    login_as(&server, &mut client, &["USER"]).await;

    server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/api/carts/items/40")
                .json_body(json!({"quantity": 3}));
            then.status(200)
                .delay(Duration::from_millis(400))
                .json_body(cart_json());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/api/carts/items/40")
                .json_body(json!({"quantity": 4}));
            then.status(200).json_body(cart_json());
        })
        .await;

    let cart: Cart = serde_json::from_value(cart_json()).unwrap();
    let service = client.cart();
    let (first, second) = tokio::join!(service.update_quantity(&cart, 40, 3), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        service.update_quantity(&cart, 40, 4).await
    });

    assert_eq!(first.unwrap(), QuantityUpdate::Superseded);
    assert!(matches!(second.unwrap(), QuantityUpdate::Applied(_)));
}

#[tokio::test]
async fn test_checkout_keeps_order_when_clear_fails() {
    let server = MockServer::start_async().await;
    let mut client = memory_client(&server);
    login_as(&server, &mut client, &["USER"]).await;

    let order = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/orders");
            then.status(201).json_body(json!({
                "id": 55, "userId": 7, "totalAmount": 26.0, "status": "PENDING"
            }));
        })
        .await;
    let clear = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/api/carts/4/items");
            then.status(500);
        })
        .await;

    let cart: Cart = serde_json::from_value(cart_json()).unwrap();
    let placed = client
        .orders()
        .checkout(&cart, "Calle Mayor 1", "+34600000000")
        .await
        .unwrap();

    order.assert_async().await;
    clear.assert_async().await;
    assert_eq!(placed.id, 55);
    assert!(placed.can_cancel());
}

fn registration() -> RegisterRequest {
    RegisterRequest {
        first_name: "Luis".into(),
        last_name: "Gomez".into(),
        address: "Av. Sol 3".into(),
        age: 41,
        email: "luis@example.com".into(),
        password: "Secret#123".into(),
        phone_number: "+34611111111".into(),
        roles: vec![Role::User],
        active: true,
    }
}

#[tokio::test]
async fn test_register_validation_errors_are_joined() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/register");
            then.status(400).json_body(json!({
                "errors": [
                    {"field": "email", "defaultMessage": "Email should be valid"},
                    {"field": "phoneNumber", "defaultMessage": "Phone must be 7-15 digits"}
                ]
            }));
        })
        .await;

    let mut client = memory_client(&server);
    let err = client.register(&registration()).await.unwrap_err();
    assert_eq!(
        err.user_message(),
        "Email should be valid, Phone must be 7-15 digits"
    );
}

#[tokio::test]
async fn test_register_without_token_requires_login() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/register");
            then.status(201).json_body(json!({"message": "User registered"}));
        })
        .await;

    let mut client = memory_client(&server);
    let outcome = client.register(&registration()).await.unwrap();
    assert_eq!(outcome, Registration::LoginRequired);
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_register_with_token_merges_claims_and_form() {
    let server = MockServer::start_async().await;
    let token = encode(
        &Header::default(),
        &json!({"sub": "77", "exp": chrono::Utc::now().timestamp() + 3600}),
        &EncodingKey::from_secret(b"secret"),
    )
    .unwrap();
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/register");
            then.status(201).json_body(json!({ "token": token }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/users/profile");
            then.status(404);
        })
        .await;

    let mut client = memory_client(&server);
    let outcome = client.register(&registration()).await.unwrap();
    let Registration::SignedIn(session) = outcome else {
        panic!("expected a signed-in registration");
    };
    assert_eq!(session.user.id, 77);
    assert_eq!(session.user.email, "luis@example.com");
    assert_eq!(session.user.roles, vec![Role::User]);
    assert_eq!(client.landing_path(), "/customer/dashboard");
}

#[tokio::test]
async fn test_register_with_partial_user_falls_back_to_claims() {
    let server = MockServer::start_async().await;
    let token = mint_token("77", "luis@example.com", &["USER"]);
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/register");
            then.status(201).json_body(json!({
                "token": token,
                "user": {"email": "luis@example.com", "roles": ["USER"], "age": null}
            }));
        })
        .await;
    let profile_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/users/profile");
            then.status(500);
        })
        .await;

    let mut client = memory_client(&server);
    let outcome = client.register(&registration()).await.unwrap();
    let Registration::SignedIn(session) = outcome else {
        panic!("expected a signed-in registration");
    };
    profile_mock.assert_async().await;
    assert_eq!(session.user.id, 77);
    assert_eq!(session.user.roles, vec![Role::User]);
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_session_persists_across_clients() {
    let server = MockServer::start_async().await;
    let dir = TempDir::new().unwrap();
    let config = ClientConfig::new(server.url("/api")).with_storage_dir(dir.path());

    let token = mint_token("7", "ana@example.com", &["ADMIN"]);
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/login");
            then.status(200).json_body(json!({ "token": token }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/users/profile");
            then.status(200).json_body(profile(7, &["ADMIN"]));
        })
        .await;

    let mut first = PharmacyClient::new(config.clone()).unwrap();
    first.login("ana@example.com", "Secret#123").await.unwrap();

    let mut second =
        PharmacyClient::with_storage(config.clone(), FileStorage::new(dir.path())).unwrap();
    assert_eq!(second.primary_role(), Some(Role::Admin));
    assert!(matches!(
        second.cart().get_or_create().await,
        Err(ClientError::Policy(PolicyError::CartNotAllowed { role: Role::Admin, .. }))
    ));

    second.logout().unwrap();
    assert!(!first.is_authenticated());
}
