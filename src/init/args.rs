// SPDX-License-Identifier: Apache-2.0

use crate::init::events_exporter::EventsExporterArgs;
use crate::init::siglog_receiver::SigLogReceiverArgs;

/// Arguments for the `start` subcommand
#[derive(Debug, clap::Args, Clone)]
pub struct MonitorRun {
    #[command(flatten)]
    pub siglog_receiver: SigLogReceiverArgs,

    #[command(flatten)]
    pub events_exporter: EventsExporterArgs,
}
