// SPDX-License-Identifier: Apache-2.0

//! Signature log receiver
//!
//! Tails an IDS signature log looking for alerts raised by healthcheck
//! probes. Candidate lines are pre-filtered on the configured signature
//! name, parsed into normalized probe events, and pushed to the output
//! channel.

pub mod config;
pub mod error;
pub mod event;
pub mod parser;
pub mod receiver;
pub mod tailer;
