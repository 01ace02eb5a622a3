use super::*;

// Env tests use variable names no other test touches.

#[test]
fn env_parse_reads_valid_number() {
    let key = "__TEST_PORTAL_PARSE_OK_114__";
    unsafe { std::env::set_var(key, "42") };
    assert_eq!(env_parse(key, 7_u64), 42);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_falls_back_on_garbage() {
    let key = "__TEST_PORTAL_PARSE_BAD_115__";
    unsafe { std::env::set_var(key, "soon") };
    assert_eq!(env_parse(key, 7_u64), 7);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_falls_back_when_unset() {
    assert_eq!(env_parse("__TEST_PORTAL_SURELY_UNSET_116__", 9_u32), 9);
}

#[test]
fn default_config_uses_documented_values() {
    let cfg = ClientConfig::default();
    assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    assert_eq!(cfg.request_timeout, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
    assert_eq!(cfg.connect_timeout, Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));
}

#[test]
fn with_base_url_strips_trailing_slashes() {
    let cfg = ClientConfig::default().with_base_url(" https://portal.example.test/// ");
    assert_eq!(cfg.base_url, "https://portal.example.test");
}
