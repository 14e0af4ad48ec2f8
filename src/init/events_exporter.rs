// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use clap::Args;

use crate::bounded_channel::BoundedReceiver;
use crate::exporters::events::EventsExporter;
use crate::receivers::siglog::event::ProbeEvent;

#[derive(Debug, Args, Clone, Default)]
pub struct EventsExporterArgs {
    /// File to append events to as JSON lines; stdout when unset
    #[arg(long, env = "PROBEWATCH_EVENTS_OUTPUT")]
    pub events_output: Option<PathBuf>,
}

impl EventsExporterArgs {
    pub fn build_exporter(&self, input: BoundedReceiver<ProbeEvent>) -> EventsExporter {
        EventsExporter::new(self.events_output.clone(), input)
    }
}
