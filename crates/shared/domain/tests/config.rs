use wine_domain::config::{ApiConfig, DocsConfig, ServerConfig, VersioningConfig};
use wine_domain::constants::API_TITLE;
use wine_domain::version::ApiVersion;
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 4583);
    assert!(server.ssl.is_none());

    let versioning = VersioningConfig::default();
    assert_eq!(versioning.default_version, ApiVersion::new(1, 0));
    assert!(versioning.assume_default_version_when_unspecified);
    assert!(versioning.report_api_versions);
    assert_eq!(versioning.versions.len(), 1);

    let docs = DocsConfig::default();
    assert_eq!(docs.title, API_TITLE);
    assert!(docs.xml_comments.is_none());
}

#[test]
fn api_config_deserializes() {
    let raw = json!({
        "server": { "address": "::", "port": 8443, "http_port": 8080 },
        "versioning": {
            "default_version": "1.0",
            "versions": [
                { "version": "1.0", "deprecated": true },
                { "version": "2" }
            ]
        },
        "security": { "api_tokens": ["secret"] }
    });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 8443);
    assert_eq!(cfg.server.http_port, 8080);
    assert_eq!(cfg.versioning.versions[1].version, ApiVersion::new(2, 0));
    assert!(cfg.versioning.versions[0].deprecated);
    assert!(!cfg.versioning.versions[1].deprecated);
    assert_eq!(cfg.security.api_tokens, vec!["secret".to_owned()]);
    assert_eq!(cfg.docs.title, API_TITLE, "unset sections fall back to defaults");
}

#[test]
fn invalid_version_is_rejected() {
    let raw = json!({ "versioning": { "default_version": "latest" } });
    let err = serde_json::from_value::<ApiConfig>(raw).expect_err("bad version must fail");
    assert!(err.to_string().contains("latest"), "unexpected error: {err}");
}

#[test]
fn versions_serialize_as_strings() {
    let value = serde_json::to_value(ApiVersion::new(2, 1)).expect("serialize");
    assert_eq!(value, json!("2.1"));
}

#[test]
fn api_tokens_accept_lists_and_comma_separated_strings() {
    let listed: ApiConfig =
        serde_json::from_value(json!({ "security": { "api_tokens": ["a", "b"] } }))
            .expect("token list");
    assert_eq!(listed.security.api_tokens, ["a", "b"]);

    let joined: ApiConfig =
        serde_json::from_value(json!({ "security": { "api_tokens": "a, b," } }))
            .expect("comma-separated tokens");
    assert_eq!(joined.security.api_tokens, ["a", "b"]);
}
