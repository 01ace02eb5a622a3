use super::*;

#[test]
fn defaults_match_documented_values() {
    let config = ServiceConfig::default();
    assert_eq!(config.port, 3000);
    assert_eq!(config.chrome_bin, "chromium");
    assert_eq!(config.chrome_debug_port, 9222);
    assert_eq!(config.page_load_timeout, Duration::from_secs(30));
    assert_eq!(config.settle_delay, Duration::from_secs(1));
}

#[test]
fn env_parse_reads_valid_value() {
    unsafe { std::env::set_var("SCREENSHOT_TEST_ENV_PARSE_VALID", " 4242 ") };
    assert_eq!(env_parse("SCREENSHOT_TEST_ENV_PARSE_VALID", 1_u16), 4242);
}

#[test]
fn env_parse_falls_back_on_garbage() {
    unsafe { std::env::set_var("SCREENSHOT_TEST_ENV_PARSE_BAD", "soon") };
    assert_eq!(env_parse("SCREENSHOT_TEST_ENV_PARSE_BAD", 7_u64), 7);
}

#[test]
fn env_parse_falls_back_when_unset() {
    assert_eq!(env_parse("SCREENSHOT_TEST_ENV_PARSE_UNSET", 9_u16), 9);
}
