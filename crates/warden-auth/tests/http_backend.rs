//! HTTP backend client against a mock server.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use warden_auth::{
    AuthOrchestrator, AuthParams, BackendClient, BackendError, GooglePlayValidation,
    HttpBackendClient, MemoryProviderStore, PlatformAccountProvider, ProviderPreferenceStore,
    ProviderRegistry, SessionStore, SocialTokenProvider,
};
use warden_core::{EntitlementToken, ProviderCredential, ProviderKind, Session};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HttpBackendClient {
    HttpBackendClient::new(&server.uri(), "A1B2", Duration::from_secs(5)).expect("client")
}

fn session() -> Session {
    Session::new(
        "PLAYER1",
        EntitlementToken::new("ticket-abc".into()),
        ProviderKind::Device,
    )
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "code": 200,
        "status": "OK",
        "data": data,
    }))
}

#[tokio::test]
async fn device_login_maps_to_custom_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Client/LoginWithCustomID"))
        .and(body_partial_json(json!({
            "TitleId": "A1B2",
            "CustomId": "device-0001",
            "CreateAccount": true,
        })))
        .respond_with(ok(json!({
            "PlayFabId": "PLAYER1",
            "SessionTicket": "ticket-abc",
            "NewlyCreated": true,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = client(&server)
        .login(
            &ProviderCredential::Device {
                device_id: "device-0001".into(),
            },
            true,
        )
        .await
        .expect("login");

    assert_eq!(session.player_id, "PLAYER1");
    assert_eq!(session.entitlement_token.expose(), "ticket-abc");
    assert_eq!(session.provider_kind, ProviderKind::Device);
    assert!(session.newly_created);
}

#[tokio::test]
async fn social_login_sends_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Client/LoginWithFacebook"))
        .and(body_partial_json(json!({ "AccessToken": "fb-token", "CreateAccount": false })))
        .respond_with(ok(json!({
            "PlayFabId": "PLAYER2",
            "SessionTicket": "ticket-def",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = client(&server)
        .login(
            &ProviderCredential::SocialToken {
                token: "fb-token".into(),
            },
            false,
        )
        .await
        .expect("login");

    assert_eq!(session.provider_kind, ProviderKind::SocialToken);
    assert!(!session.newly_created);
}

#[tokio::test]
async fn token_providers_log_in_through_their_backend_operations() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Client/LoginWithFacebook"))
        .and(body_partial_json(json!({ "AccessToken": "EAAB-access" })))
        .respond_with(ok(json!({ "PlayFabId": "FB1", "SessionTicket": "t-fb" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/Client/LoginWithGoogleAccount"))
        .and(body_partial_json(json!({ "ServerAuthCode": "4/0Adeu5B" })))
        .respond_with(ok(json!({ "PlayFabId": "GP1", "SessionTicket": "t-gp" })))
        .expect(1)
        .mount(&server)
        .await;

    let preferences = Arc::new(MemoryProviderStore::new());
    let providers = ProviderRegistry::new()
        .with(Arc::new(SocialTokenProvider::new("EAAB-access")))
        .with(Arc::new(PlatformAccountProvider::new("4/0Adeu5B")));
    let orchestrator = AuthOrchestrator::new(
        providers,
        Arc::new(client(&server)),
        SessionStore::new(),
        preferences.clone(),
    );

    let social = orchestrator
        .login(ProviderKind::SocialToken, &AuthParams::default())
        .await
        .expect("social login");
    assert_eq!(social.player_id, "FB1");

    let platform = orchestrator
        .login(ProviderKind::PlatformAccount, &AuthParams::default())
        .await
        .expect("platform login");
    assert_eq!(platform.player_id, "GP1");
    assert_eq!(preferences.load_last_provider(), ProviderKind::PlatformAccount);
}

#[tokio::test]
async fn error_envelope_becomes_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Client/LoginWithPlayFab"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": 400,
            "status": "BadRequest",
            "error": "InvalidUsernameOrPassword",
            "errorMessage": "Invalid username or password",
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .login_with_password("alice", "wrong")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BackendError::Rejected {
            code: 400,
            message: "Invalid username or password".into(),
        }
    );
}

#[tokio::test]
async fn inventory_is_authorized_and_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Client/GetUserInventory"))
        .and(header("X-Authorization", "ticket-abc"))
        .respond_with(ok(json!({
            "Inventory": [{ "ItemId": "sword", "ItemInstanceId": "i1" }],
            "VirtualCurrency": { "GE": 120, "GO": 0 },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = client(&server)
        .get_inventory(&session())
        .await
        .expect("inventory");

    assert_eq!(snapshot.currency("GE"), 120);
    assert_eq!(snapshot.currency("GO"), 0);
    assert!(snapshot.owns("sword"));
}

#[tokio::test]
async fn credit_returns_new_balance() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Client/AddUserVirtualCurrency"))
        .and(header("X-Authorization", "ticket-abc"))
        .and(body_partial_json(json!({ "VirtualCurrency": "GE", "Amount": 25 })))
        .respond_with(ok(json!({ "VirtualCurrency": "GE", "Balance": 145 })))
        .expect(1)
        .mount(&server)
        .await;

    let balance = client(&server)
        .credit_currency(&session(), "GE", 25)
        .await
        .expect("credit");

    assert_eq!(balance, 145);
}

#[tokio::test]
async fn google_play_validation_posts_receipt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Client/ValidateGooglePlayPurchase"))
        .and(body_partial_json(json!({
            "CurrencyCode": "USD",
            "PurchasePrice": 199,
            "ReceiptJson": "{\"orderId\":\"GPA.1\"}",
            "Signature": "sig",
        })))
        .respond_with(ok(json!({ "Fulfillments": [] })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .validate_google_play_purchase(
            &session(),
            &GooglePlayValidation {
                currency_code: "USD".into(),
                purchase_price: 199,
                receipt_json: "{\"orderId\":\"GPA.1\"}".into(),
                signature: "sig".into(),
            },
        )
        .await
        .expect("validation accepted");
}

#[tokio::test]
async fn server_function_error_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Client/ExecuteCloudScript"))
        .and(body_partial_json(json!({ "FunctionName": "buyItem" })))
        .respond_with(ok(json!({
            "FunctionName": "buyItem",
            "Error": { "Error": "JavascriptException", "Message": "insufficient funds" },
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .execute_function(&session(), "buyItem", json!({ "itemId": "sword" }))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BackendError::FunctionFailed {
            function: "buyItem".into(),
            message: "insufficient funds".into(),
        }
    );
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    // Nothing listens on port 1.
    let client = HttpBackendClient::new("http://127.0.0.1:1", "A1B2", Duration::from_secs(2))
        .expect("client");
    let err = client.get_inventory(&session()).await.unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)));
}
