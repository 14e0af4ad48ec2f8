// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::receivers::siglog::config::SigLogReceiverConfig;

#[derive(Debug, Args, Clone)]
pub struct SigLogReceiverArgs {
    /// Path to the signature log file to monitor
    #[arg(long, env = "PROBEWATCH_SIGLOG_PATH")]
    pub siglog_path: PathBuf,

    /// Signature name identifying healthcheck probe lines
    #[arg(long, env = "PROBEWATCH_SIGLOG_SIGNATURE")]
    pub siglog_signature: String,

    /// Seconds to sleep between polls when no new lines are available (default: 3)
    #[arg(long, env = "PROBEWATCH_SIGLOG_POLL_INTERVAL")]
    pub siglog_poll_interval: Option<u64>,

    /// IP protocol recorded on events when the log format does not carry one (default: tcp)
    #[arg(long, env = "PROBEWATCH_SIGLOG_PROTOCOL")]
    pub siglog_protocol: Option<String>,

    /// Set when the log format itself records the IP protocol
    #[arg(
        long,
        env = "PROBEWATCH_SIGLOG_LOG_HAS_PROTOCOL",
        default_value = "false"
    )]
    pub siglog_log_has_protocol: bool,
}

impl SigLogReceiverArgs {
    pub fn build_config(&self) -> SigLogReceiverConfig {
        let mut config = SigLogReceiverConfig::new(&self.siglog_path, &self.siglog_signature);

        if let Some(secs) = self.siglog_poll_interval {
            config = config.with_poll_interval(Duration::from_secs(secs));
        }
        if let Some(protocol) = &self.siglog_protocol {
            config = config.with_protocol(protocol.clone());
        }

        config.with_log_has_protocol(self.siglog_log_has_protocol)
    }
}
