#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use cashdesk_client::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
client:
  endpoint: "wss://test-api.example.com/ws/cashdesk"
  keep_alive: 1000 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.kind().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
client:
  endpoint: "wss://test-api.example.com/ws/cashdesk"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.client.keep_alive(), Some(Duration::from_secs(30)));
    assert_eq!(cfg.client.receive_buffer_bytes, 32 * 1024);
    assert!(cfg.cashier.is_none());
}

#[test]
fn full_config_with_headers_and_cashier() {
    let ok = r#"
version: 1
client:
  endpoint: "ws://localhost:9000/ws/cashdesk"
  keep_alive_ms: 0
  receive_buffer_bytes: 1024
  headers:
    X-Api-Key: "abc"
cashier:
  account_id: "acc-1"
  user_name: "cashier-1"
  password: "secret"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert!(cfg.client.keep_alive().is_none());
    assert_eq!(cfg.client.effective_receive_buffer(), 4096);
    assert_eq!(cfg.client.headers.get("x-api-key"), Some("abc"));

    let cashier = cfg.cashier.expect("cashier section");
    assert_eq!(cashier.user_name, "cashier-1");
    assert!(!format!("{cashier:?}").contains("secret"));
}

#[test]
fn unsupported_version() {
    let bad = r#"
version: 2
client:
  endpoint: "ws://localhost"
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.kind().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn keep_alive_out_of_range() {
    let bad = r#"
version: 1
client:
  endpoint: "ws://localhost"
  keep_alive_ms: 10
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.kind().as_str(), "CONFIG");
}

#[test]
fn blank_cashier_password_rejected() {
    let bad = r#"
version: 1
client:
  endpoint: "ws://localhost"
cashier:
  account_id: "acc-1"
  user_name: "cashier-1"
  password: ""
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.kind().as_str(), "INVALID_REQUEST");
}

#[test]
fn missing_file_is_config_error() {
    let err = config::load_from_file("/nonexistent/cashdesk.yaml").expect_err("must fail");
    assert_eq!(err.kind().as_str(), "CONFIG");
}
