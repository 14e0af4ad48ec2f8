// SPDX-License-Identifier: Apache-2.0

//! Monitor loop for the signature log receiver.
//!
//! Pulls candidate lines from the tailer, parses each into a probe event,
//! and publishes events to the output channel. Malformed lines are logged
//! and skipped; I/O failures propagate out of the loop and surface through
//! the task set.

use tokio::select;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tower::BoxError;
use tracing::{debug, error, info, warn};

use crate::bounded_channel::BoundedSender;
use crate::receivers::siglog::config::SigLogReceiverConfig;
use crate::receivers::siglog::error::{Error, Result};
use crate::receivers::siglog::event::{EventTemplate, ProbeEvent};
use crate::receivers::siglog::parser::SigLogParser;
use crate::receivers::siglog::tailer::LogTailer;

pub struct SigLogReceiver {
    config: SigLogReceiverConfig,
    output: BoundedSender<ProbeEvent>,
}

impl SigLogReceiver {
    pub fn new(config: SigLogReceiverConfig, output: BoundedSender<ProbeEvent>) -> Result<Self> {
        config.validate().map_err(Error::Config)?;

        info!(
            path = %config.path.display(),
            signature = %config.signature,
            poll_interval = ?config.poll_interval,
            "Signature log receiver initialized"
        );

        Ok(Self { config, output })
    }

    pub fn start(
        self,
        task_set: &mut JoinSet<std::result::Result<(), BoxError>>,
        receivers_cancel: &CancellationToken,
    ) {
        let cancel = receivers_cancel.clone();

        info!(path = %self.config.path.display(), "Signature log receiver starting");

        task_set.spawn(async move {
            let result = run_monitor_loop(self.config, self.output, cancel).await;
            if let Err(ref e) = result {
                error!("Signature log receiver error: {}", e);
            }
            result.map_err(Into::into)
        });
    }
}

async fn run_monitor_loop(
    config: SigLogReceiverConfig,
    output: BoundedSender<ProbeEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    let parser = SigLogParser::new()?;
    let template = EventTemplate::from_config(&config);
    let mut tailer = LogTailer::start_at_end(&config.path, config.signature.clone())?;

    loop {
        if cancel.is_cancelled() {
            break;
        }

        // I/O failures are fatal to the loop and propagate to the task set
        let lines = tailer.poll()?;

        if lines.is_empty() {
            // Sole suspension point: sleep until the next poll, raced
            // against shutdown
            select! {
                _ = sleep(config.poll_interval) => {}
                _ = cancel.cancelled() => break,
            }
            continue;
        }

        // All lines from one poll cycle are published in file order before
        // the next poll
        for line in lines {
            let Some(event) = parse_line(&parser, &template, &line) else {
                continue;
            };

            info!(path = %config.path.display(), "extracted new healthcheck event from log");
            debug!(?event, "publishing parsed event");

            if output.send(event).await.is_err() {
                return Err(Error::ChannelSend);
            }
        }
    }

    info!("Signature log receiver stopped");
    Ok(())
}

/// Parse one raw line, absorbing malformed input: a line that matched the
/// signature filter but not the field shape is logged and dropped, never a
/// loop failure.
fn parse_line(parser: &SigLogParser, template: &EventTemplate, line: &str) -> Option<ProbeEvent> {
    match parser.parse(line).and_then(|f| f.into_event(template)) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("error parsing input as signature log data: {}", e);
            debug!(line, "faulty input data");
            None
        }
    }
}
