mod common;

use common::{MockFactory, init_tracing, user};
use ras_identity_oidc::{
    Auth0Provider, AzureB2cProvider, CognitoProvider, HostedProvider, IdentityClient,
    InMemoryPlatform, OidcError, OidcProvider, ProviderEvents, ProviderOptions,
    SignoutRedirectArgs, StorageType, use_auth0, use_azure, use_cognito,
};
use std::collections::BTreeMap;
use std::sync::Arc;

fn options(domain: &str) -> ProviderOptions {
    ProviderOptions::builder()
        .domain(domain)
        .client_id("test-client-id")
        .redirect_uri("http://localhost:3000")
        .build()
}

fn caller_logout() -> SignoutRedirectArgs {
    SignoutRedirectArgs {
        extra_query_params: BTreeMap::from([("ui_locales".to_string(), "de".to_string())]),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_cognito_logout_injects_required_params() {
    init_tracing();
    let factory = MockFactory::new();
    let props = CognitoProvider::props(
        &options("test.auth.us-east-1.amazoncognito.com"),
        ProviderEvents::default(),
    )
    .unwrap();
    let provider = OidcProvider::new(
        props,
        factory.factory(),
        Arc::new(InMemoryPlatform::new("/")),
    )
    .unwrap();
    let client = factory.client();
    client.set_user(Some(user("user123", "access", Some(3600))));
    provider.mount().await;

    let auth = use_cognito(&provider.context()).unwrap();
    assert!(auth.is_authenticated);
    auth.logout(caller_logout()).await.unwrap();

    let sent = client.signout_args.lock().unwrap()[0]
        .extra_query_params
        .clone();
    assert_eq!(
        sent,
        BTreeMap::from([
            ("client_id".to_string(), "test-client-id".to_string()),
            ("redirect_uri".to_string(), "http://localhost:3000".to_string()),
            ("response_type".to_string(), "code".to_string()),
            ("ui_locales".to_string(), "de".to_string()),
        ])
    );
}

#[tokio::test]
async fn test_auth0_logout_injects_client_id() {
    init_tracing();
    let factory = MockFactory::new();
    let mut options = options("test.auth0.com");
    options.audience = Some("https://api.example.com".to_string());
    let provider = OidcProvider::new(
        Auth0Provider::props(&options, ProviderEvents::default()).unwrap(),
        factory.factory(),
        Arc::new(InMemoryPlatform::new("/")),
    )
    .unwrap();
    let client = factory.client();
    provider.mount().await;

    assert_eq!(
        client.settings().extra_query_params.get("audience"),
        Some(&"https://api.example.com".to_string())
    );

    let auth = use_auth0(&provider.context()).unwrap();
    auth.logout(SignoutRedirectArgs::default()).await.unwrap();

    let sent = client.signout_args.lock().unwrap()[0]
        .extra_query_params
        .clone();
    assert_eq!(
        sent,
        BTreeMap::from([("client_id".to_string(), "test-client-id".to_string())])
    );
}

#[tokio::test]
async fn test_azure_b2c_endpoints_and_plain_logout() {
    init_tracing();
    let factory = MockFactory::new();
    let mut options = options("test.b2clogin.com");
    options.policy = Some("B2C_1_signin".to_string());
    let provider = OidcProvider::new(
        AzureB2cProvider::props(&options, ProviderEvents::default()).unwrap(),
        factory.factory(),
        Arc::new(InMemoryPlatform::new("/")),
    )
    .unwrap();
    let client = factory.client();
    provider.mount().await;

    let metadata = client.settings().metadata.clone().unwrap();
    assert_eq!(
        metadata.authorization_endpoint,
        "https://test.b2clogin.com/B2C_1_signin/oauth2/v2.0/authorize"
    );

    let auth = use_azure(&provider.context()).unwrap();
    auth.logout(caller_logout()).await.unwrap();

    let sent = client.signout_args.lock().unwrap()[0]
        .extra_query_params
        .clone();
    assert_eq!(
        sent,
        BTreeMap::from([("ui_locales".to_string(), "de".to_string())])
    );
}

#[test]
fn test_props_carry_token_storage() {
    let mut options = options("test.auth0.com");
    options.token_storage = StorageType::MemoryStorage;

    let props = Auth0Provider::props(&options, ProviderEvents::default()).unwrap();
    assert!(matches!(props.token_storage, StorageType::MemoryStorage));
    assert_eq!(props.settings.client_id, "test-client-id");
}

#[test]
fn test_props_reject_invalid_options() {
    let result = CognitoProvider::props(&options(""), ProviderEvents::default());
    assert!(matches!(result, Err(OidcError::Configuration(_))));

    let result = AzureB2cProvider::props(&options("test.b2clogin.com"), ProviderEvents::default());
    assert!(matches!(result, Err(OidcError::Configuration(_))));
}

#[tokio::test]
async fn test_accessors_outside_provider() {
    let factory = MockFactory::new();
    let provider = OidcProvider::new(
        CognitoProvider::props(&options("test.example.com"), ProviderEvents::default()).unwrap(),
        factory.factory(),
        Arc::new(InMemoryPlatform::new("/")),
    )
    .unwrap();
    let ctx = provider.context();
    provider.unmount();

    assert_eq!(
        use_cognito(&ctx).unwrap_err(),
        OidcError::outside_provider("use_cognito")
    );
    assert_eq!(
        use_auth0(&Default::default()).unwrap_err(),
        OidcError::outside_provider("use_auth0")
    );
}
