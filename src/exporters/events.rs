// SPDX-License-Identifier: Apache-2.0

//! Reference sink for probe events: one JSON object per line, written to
//! stdout or a configured file.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use thiserror::Error;
use tokio::select;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tower::BoxError;
use tracing::{error, info};

use crate::bounded_channel::BoundedReceiver;
use crate::receivers::siglog::event::ProbeEvent;

#[derive(Error, Debug)]
pub enum EventsExporterError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Export error: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, EventsExporterError>;

pub struct EventsExporter {
    /// Destination file, or stdout when unset
    destination: Option<PathBuf>,
    input: BoundedReceiver<ProbeEvent>,
}

impl EventsExporter {
    pub fn new(destination: Option<PathBuf>, input: BoundedReceiver<ProbeEvent>) -> Self {
        Self { destination, input }
    }

    pub fn start(
        self,
        task_set: &mut JoinSet<std::result::Result<(), BoxError>>,
        exporters_cancel: &CancellationToken,
    ) {
        let cancel = exporters_cancel.clone();

        task_set.spawn(async move {
            let result = run_exporter(self.input, self.destination, cancel).await;
            if let Err(ref e) = result {
                error!("Events exporter error: {}", e);
            }
            result.map_err(Into::into)
        });
    }
}

async fn run_exporter(
    mut input: BoundedReceiver<ProbeEvent>,
    destination: Option<PathBuf>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut writer: Box<dyn Write + Send> = match &destination {
        Some(path) => Box::new(OpenOptions::new().create(true).append(true).open(path)?),
        None => Box::new(io::stdout()),
    };

    info!(
        destination = %destination
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".to_string()),
        "Events exporter started"
    );

    loop {
        select! {
            biased;

            event = input.next() => match event {
                Some(event) => write_event(&mut writer, &event)?,
                None => break, // all senders dropped
            },

            _ = cancel.cancelled() => break,
        }
    }

    // Drain anything still buffered before stopping
    while let Some(event) = input.try_recv() {
        write_event(&mut writer, &event)?;
    }

    writer.flush()?;
    info!("Events exporter stopped");
    Ok(())
}

fn write_event<W: Write>(writer: &mut W, event: &ProbeEvent) -> Result<()> {
    serde_json::to_writer(&mut *writer, event)
        .map_err(|e| EventsExporterError::Export(format!("Failed to write JSON: {}", e)))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
