use serde_json::json;

use super::*;
use crate::error::ErrorCode;
use crate::net::types::{ClassItem, Teacher};
use crate::session::MemoryStore;

fn client_at(base_url: &str) -> ApiClient {
    let config = ClientConfig::from_lookup(|_| None).with_base_url(base_url);
    ApiClient::new(&config, Arc::new(MemoryStore::new())).unwrap()
}

#[test]
fn endpoint_joins_without_double_slash() {
    assert_eq!(endpoint("http://localhost:5000/", "/api/classes"), "http://localhost:5000/api/classes");
    assert_eq!(endpoint("http://localhost:5000", "/auth/login"), "http://localhost:5000/auth/login");
}

#[test]
fn server_message_prefers_message_field() {
    assert_eq!(server_message(&json!({"message": "Invalid credentials"})), "Invalid credentials");
}

#[test]
fn server_message_falls_back_to_raw_body() {
    assert_eq!(server_message(&json!({"error": "nope"})), r#"{"error":"nope"}"#);
}

#[test]
fn server_message_of_empty_body_is_empty() {
    assert_eq!(server_message(&Value::Null), "");
}

#[test]
fn server_message_of_string_body_is_the_string() {
    assert_eq!(server_message(&json!("Forbidden")), "Forbidden");
}

#[test]
fn base_url_comes_from_config() {
    let client = client_at("http://127.0.0.1:1/");
    assert_eq!(client.base_url(), "http://127.0.0.1:1");
}

#[test]
fn item_url_appends_id_segment() {
    let client = client_at("http://127.0.0.1:1/");
    assert_eq!(client.item_url::<Teacher>("t1").unwrap().as_str(), "http://127.0.0.1:1/api/teachers/t1");
}

#[test]
fn item_url_escapes_reserved_characters() {
    let client = client_at("http://127.0.0.1:1");
    let url = client.item_url::<ClassItem>("a/b?c#d").unwrap();
    assert_eq!(url.as_str(), "http://127.0.0.1:1/api/classes/a%2Fb%3Fc%23d");
}

#[test]
fn item_url_rejects_unparsable_base() {
    let client = client_at("not a url");
    let err = client.item_url::<ClassItem>("c1").unwrap_err();
    assert_eq!(err.error_code(), "E_INVALID_URL");
}
