use std::collections::HashMap;
use std::time::Duration;

use crate::runtime::{AppConfig, EVENT_BUFFER_ENV, TICK_RATE_ENV};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn missing_variables_keep_defaults() {
    let config = AppConfig::from_vars(lookup(&[])).unwrap();
    assert_eq!(config, AppConfig::default());
}

#[test]
fn variables_override_defaults() {
    let config = AppConfig::from_vars(lookup(&[
        (TICK_RATE_ENV, " 50 "),
        (EVENT_BUFFER_ENV, "0"),
    ]))
    .unwrap();
    assert_eq!(config.tick_rate, Duration::from_millis(50));
    assert_eq!(config.event_buffer, 1);
}

#[test]
fn malformed_variables_are_rejected() {
    let err = AppConfig::from_vars(lookup(&[(TICK_RATE_ENV, "fast")])).unwrap_err();
    assert!(err.to_string().contains(TICK_RATE_ENV));
}
