//! Integration tests for configuration and endpoint resolution.
//!
//! Tests TOML loading end to end, from file to a ready API client.

use std::io::Write;

use rental_client::{
    ClientConfig, RentalApi, RentalError,
    api::{ConfigurableEndpointResolver, Endpoint, EndpointResolver},
    transport::HttpVersion,
};

#[test]
fn test_full_configuration_flow() {
    let toml = r#"
        base_url = "https://rental.example.com/"
        api_prefix = "/api/v1"

        [endpoints]
        plans = "/catalogo/planes"
        client_subscriptions = "/clientes/{id}/suscripciones"
        subscription = "/suscripciones/{id}"

        [http]
        timeout_secs = 15
        connect_timeout_secs = 5
        pool_max_idle_per_host = 4
        http_version = "http1"
    "#;

    let config = ClientConfig::from_toml(toml).expect("should parse valid TOML");
    assert_eq!(config.api_base(), "https://rental.example.com/api/v1");
    assert!(!config.allow_insecure);
    assert_eq!(config.http.timeout_secs, 15);
    assert_eq!(config.http.http_version, HttpVersion::Http1);

    let resolver = ConfigurableEndpointResolver::new(&config.endpoints);
    assert_eq!(resolver.resolve(Endpoint::Plans), "/catalogo/planes");
    assert_eq!(resolver.resolve(Endpoint::ClientSubscriptions(4)), "/clientes/4/suscripciones");
    assert_eq!(resolver.resolve(Endpoint::Subscription(42)), "/suscripciones/42");
    assert_eq!(resolver.resolve(Endpoint::Payments), "/pagos");

    let api = RentalApi::from_config(&config).expect("should build client");
    assert_eq!(api.api_base(), "https://rental.example.com/api/v1");
}

#[test]
fn test_local_development_config() {
    let config = ClientConfig::from_toml("allow_insecure = true").expect("should parse");
    assert_eq!(config.api_base(), "http://localhost:8000/api");
    assert!(RentalApi::from_config(&config).is_ok());
}

#[test]
fn test_plain_http_rejected_without_opt_in() {
    let result = ClientConfig::from_toml(r#"base_url = "http://rental.example.com""#);
    assert!(matches!(result, Err(RentalError::Config(_))));
}

#[test]
fn test_loopback_rejected_without_opt_in() {
    assert!(ClientConfig::from_toml("").is_err());
}

#[test]
fn test_traversal_in_endpoint_rejected() {
    let toml = r#"
        base_url = "https://rental.example.com"

        [endpoints]
        payments = "/pagos/../admin"
    "#;
    let err = ClientConfig::from_toml(toml).unwrap_err();
    assert!(err.to_string().contains("payments"));
}

#[test]
fn test_timeout_out_of_range_rejected() {
    let toml = r#"
        base_url = "https://rental.example.com"

        [http]
        timeout_secs = 0
    "#;
    assert!(ClientConfig::from_toml(toml).is_err());
}

#[test]
fn test_malformed_toml_rejected() {
    let err = ClientConfig::from_toml("base_url = ").unwrap_err();
    assert!(matches!(err, RentalError::Config(_)));
}

#[test]
fn test_config_from_file() {
    let path = std::env::temp_dir().join(format!("rental-config-{}.toml", uuid::Uuid::new_v4()));
    let mut file = std::fs::File::create(&path).expect("should create temp file");
    writeln!(file, r#"base_url = "https://rental.example.com""#).expect("should write");
    drop(file);

    let config = ClientConfig::from_file(&path).expect("should load");
    assert_eq!(config.base_url, "https://rental.example.com");
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_missing_file_is_config_error() {
    let err = ClientConfig::from_file("/nonexistent/rental.toml").unwrap_err();
    assert!(matches!(err, RentalError::Config(_)));
}
