// SPDX-License-Identifier: Apache-2.0

pub mod args;
pub mod events_exporter;
pub mod siglog_receiver;
pub mod wait;
