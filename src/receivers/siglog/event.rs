// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;
use serde_json::{Map, Value};

use crate::receivers::siglog::config::SigLogReceiverConfig;

/// Normalized healthcheck probe event.
///
/// Serializes as a flat JSON mapping: the five derived fields plus whatever
/// default fields the template carried (e.g. `protocol`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeEvent {
    /// Alert time as ISO-8601 UTC with second precision
    pub alert_time: String,
    pub src_addr: String,
    pub src_port: u16,
    pub dest_addr: String,
    pub dest_port: u16,
    /// Default fields carried forward from the event template
    #[serde(flatten)]
    pub defaults: Map<String, Value>,
}

/// Immutable set of default fields merged into every event.
///
/// Built once at receiver startup and cloned per event, so consecutive
/// events never share a backing object.
#[derive(Debug, Clone, Default)]
pub struct EventTemplate {
    defaults: Map<String, Value>,
}

/// Keys owned by the parser; a template is not allowed to override them.
const DERIVED_KEYS: [&str; 5] = ["alert_time", "src_addr", "src_port", "dest_addr", "dest_port"];

impl EventTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the template from receiver configuration. Signature logs do not
    /// record the IP protocol, so unless the config says the log carries one
    /// the template supplies the configured default.
    pub fn from_config(config: &SigLogReceiverConfig) -> Self {
        let mut template = Self::new();
        if !config.log_has_protocol {
            template.insert("protocol", Value::String(config.protocol.clone()));
        }
        template
    }

    /// Add a default field. Keys the parser derives are dropped here so a
    /// template value can never mask a parsed one.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if DERIVED_KEYS.contains(&key.as_str()) {
            return;
        }
        self.defaults.insert(key, value);
    }

    /// Produce a fresh copy of the default fields for one event.
    pub fn instantiate(&self) -> Map<String, Value> {
        self.defaults.clone()
    }

    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }
}
