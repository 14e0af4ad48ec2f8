// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use std::time::Duration;

/// Default sleep period between polls when no new lines are available
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Default IP protocol recorded on events when the log format does not
/// carry one (signature logs omit it)
pub const DEFAULT_PROTOCOL: &str = "tcp";

/// Configuration for the signature log receiver
#[derive(Debug, Clone)]
pub struct SigLogReceiverConfig {
    /// Path to the signature log file to tail
    pub path: PathBuf,

    /// Signature name identifying healthcheck probe lines. Matched as an
    /// exact, case-sensitive substring against each raw line.
    pub signature: String,

    /// Sleep period between polls when no new lines are available
    pub poll_interval: Duration,

    /// IP protocol stamped on events via the template default fields
    pub protocol: String,

    /// Whether the log format itself records the IP protocol. When false,
    /// the event template supplies `protocol` as a default field.
    pub log_has_protocol: bool,
}

impl SigLogReceiverConfig {
    pub fn new(path: impl Into<PathBuf>, signature: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            signature: signature.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            protocol: DEFAULT_PROTOCOL.to_string(),
            log_has_protocol: false,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("Log file path must be specified".to_string());
        }

        if self.signature.is_empty() {
            return Err("Signature name must not be empty".to_string());
        }

        if self.poll_interval.is_zero() {
            return Err("Poll interval must be greater than zero".to_string());
        }

        Ok(())
    }

    /// Set a custom poll interval
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Set the protocol recorded on events
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Mark the log format as carrying its own protocol field
    pub fn with_log_has_protocol(mut self, log_has_protocol: bool) -> Self {
        self.log_has_protocol = log_has_protocol;
        self
    }
}
