//! Provider configuration tests: validation diagnostics, the session
//! token exchange, and how API failures surface.

mod common;

use common::{spawn_api, FakeSignalFx, TEST_EMAIL, TEST_PASSWORD};
use hemmer_provider_signalfx::testing::{assert_error_contains, ProviderTester, TestError};
use hemmer_provider_signalfx::{ProviderError, ProviderService, SignalFxProvider, LOG_VIEW_TYPE};
use serde_json::json;

#[tokio::test]
async fn test_validate_provider_config_requires_credentials() {
    let tester = ProviderTester::new(SignalFxProvider::new());
    let err = tester
        .validate_provider_config(json!({"api_url": "https://api.signalfx.com"}))
        .await
        .unwrap_err();
    match err {
        TestError::Diagnostics(diags) => {
            assert_error_contains(&diags, "missing auth token or email and password");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_validate_provider_config_accepts_email_and_password() {
    let tester = ProviderTester::new(SignalFxProvider::new());
    tester
        .validate_provider_config(json!({
            "email": TEST_EMAIL,
            "password": TEST_PASSWORD,
        }))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_configure_exchanges_credentials_for_session() {
    let fake = FakeSignalFx::new();
    let api_url = spawn_api(fake.clone()).await;

    let tester = ProviderTester::new(SignalFxProvider::new());
    tester
        .configure(json!({
            "email": TEST_EMAIL,
            "password": TEST_PASSWORD,
            "organization_id": "org-1",
            "api_url": api_url,
        }))
        .await
        .unwrap();

    // The session token works against the chart API
    let created = tester
        .lifecycle_create(
            LOG_VIEW_TYPE,
            json!({"name": "Session chart", "program_text": "logs().publish()"}),
        )
        .await
        .unwrap();
    assert_eq!(fake.chart_count(), 1);
    assert_eq!(created["name"], "Session chart");
}

#[tokio::test]
async fn test_configure_surfaces_rejected_credentials() {
    let fake = FakeSignalFx::new();
    let api_url = spawn_api(fake).await;

    let tester = ProviderTester::new(SignalFxProvider::new());
    let err = tester
        .configure(json!({
            "email": TEST_EMAIL,
            "password": "wrong",
            "api_url": api_url,
        }))
        .await
        .unwrap_err();

    match err {
        TestError::Provider(ProviderError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert!(message.contains("Invalid username or password"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_rejected_token_surfaces_on_apply() {
    let fake = FakeSignalFx::new();
    let api_url = spawn_api(fake).await;

    // An org token is taken at face value during configure; the API
    // rejects it on the first real request.
    let tester = ProviderTester::new(SignalFxProvider::new());
    tester
        .configure(json!({"auth_token": "stale-token", "api_url": api_url}))
        .await
        .unwrap();

    let err = tester
        .create(
            LOG_VIEW_TYPE,
            json!({"name": "Chart Name", "program_text": "logs().publish()"}),
        )
        .await
        .unwrap_err();
    match err {
        ProviderError::Api { status, .. } => assert_eq!(status, 401),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_operations_require_configure() {
    let provider = SignalFxProvider::new();
    let err = provider
        .create(
            LOG_VIEW_TYPE,
            json!({"name": "Chart Name", "program_text": "logs().publish()"}),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::MetaNotProvided));
    assert_eq!(err.to_string(), "Provider meta was not provided");
}

#[tokio::test]
async fn test_unknown_resource_type_is_rejected() {
    let provider = SignalFxProvider::new();
    let err = provider
        .create("signalfx_dashboard", json!({"name": "nope"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::UnknownResource(_)));
    assert!(err.to_string().contains("signalfx_dashboard"));
}
