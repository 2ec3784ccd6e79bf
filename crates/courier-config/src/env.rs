//! Environment variable overrides.
//!
//! Variables are read through a lookup function so callers (and tests) can
//! supply something other than the process environment.

use crate::error::{ConfigError, Result};
use crate::types::BridgeConfig;

pub const PUBSUB_NAME_ENV: &str = "PUBSUB_NAME";
pub const TOPIC_NAME_ENV: &str = "TOPIC_NAME";
pub const DAPR_HTTP_ENDPOINT_ENV: &str = "DAPR_HTTP_ENDPOINT";
pub const DAPR_HTTP_PORT_ENV: &str = "DAPR_HTTP_PORT";
pub const DAPR_API_TOKEN_ENV: &str = "DAPR_API_TOKEN";
pub const ACTOR_TYPE_ENV: &str = "COURIER_ACTOR_TYPE";
pub const BIND_ADDRESS_ENV: &str = "COURIER_BIND_ADDRESS";
pub const GREETING_ENV: &str = "COURIER_GREETING";

/// Apply environment overrides on top of `config`.
///
/// Empty values are ignored. `DAPR_HTTP_ENDPOINT` wins over
/// `DAPR_HTTP_PORT`; the port alone addresses a sidecar on 127.0.0.1.
/// Returns the names of the variables that were applied.
pub fn apply_env<F>(config: &mut BridgeConfig, lookup: F) -> Result<Vec<&'static str>>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let mut applied = Vec::new();

    let string_fields: [(&'static str, &mut String); 5] = [
        (PUBSUB_NAME_ENV, &mut config.pubsub_name),
        (TOPIC_NAME_ENV, &mut config.topic_name),
        (ACTOR_TYPE_ENV, &mut config.actor_type),
        (BIND_ADDRESS_ENV, &mut config.bind_address),
        (GREETING_ENV, &mut config.greeting),
    ];
    for (name, field) in string_fields {
        if let Some(value) = get(name) {
            *field = value;
            applied.push(name);
        }
    }

    if let Some(endpoint) = get(DAPR_HTTP_ENDPOINT_ENV) {
        config.dapr_http_endpoint = endpoint;
        applied.push(DAPR_HTTP_ENDPOINT_ENV);
    } else if let Some(port) = get(DAPR_HTTP_PORT_ENV) {
        let port: u16 = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            var: DAPR_HTTP_PORT_ENV.to_string(),
            value: port.clone(),
            reason: "expected a port number".to_string(),
        })?;
        config.dapr_http_endpoint = format!("http://127.0.0.1:{port}");
        applied.push(DAPR_HTTP_PORT_ENV);
    }

    if let Some(token) = get(DAPR_API_TOKEN_ENV) {
        config.dapr_api_token = Some(token);
        applied.push(DAPR_API_TOKEN_ENV);
    }

    Ok(applied)
}
