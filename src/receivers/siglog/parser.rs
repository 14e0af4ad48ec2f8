// SPDX-License-Identifier: Apache-2.0

//! Field extraction for signature log lines.
//!
//! Relevant lines start with a fractional epoch timestamp followed by
//! whitespace-delimited fields: one ignored token, source address, source
//! port, destination address, destination port. Trailing content is
//! ignored. Pattern matching and numeric coercion are separate steps so
//! each can fail (and be tested) on its own.

use chrono::DateTime;
use regex::Regex;

use crate::receivers::siglog::error::{Error, Result};
use crate::receivers::siglog::event::{EventTemplate, ProbeEvent};

/// Pattern extracting the timestamp, endpoint addresses, and ports from a
/// signature log line. Ports stay textual here; coercion happens later.
const SIG_LOG_PATTERN: &str = r"^(?P<ts>\d+\.\d+)\s\S+\s(?P<src_addr>\S+)\s(?P<src_port>\d{1,5})\s(?P<dst_addr>\S+)\s(?P<dst_port>\d{1,5})";

pub struct SigLogParser {
    regex: Regex,
}

/// Raw capture groups from one matched line. Lives only between the regex
/// match and event construction.
#[derive(Debug)]
pub struct ParsedFields {
    pub ts: String,
    pub src_addr: String,
    pub src_port: String,
    pub dst_addr: String,
    pub dst_port: String,
}

impl SigLogParser {
    pub fn new() -> Result<Self> {
        let regex = Regex::new(SIG_LOG_PATTERN)
            .map_err(|e| Error::Config(format!("invalid signature log pattern: {}", e)))?;
        Ok(Self { regex })
    }

    /// Apply the extraction pattern to one raw line.
    pub fn parse(&self, line: &str) -> Result<ParsedFields> {
        let captures = self.regex.captures(line).ok_or_else(|| {
            Error::Parse(format!(
                "line does not match signature log shape: {:?}",
                line.chars().take(100).collect::<String>()
            ))
        })?;

        let group = |name: &str| {
            captures
                .name(name)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        };

        Ok(ParsedFields {
            ts: group("ts"),
            src_addr: group("src_addr"),
            src_port: group("src_port"),
            dst_addr: group("dst_addr"),
            dst_port: group("dst_port"),
        })
    }
}

impl ParsedFields {
    /// Coerce the textual fields and merge them with a fresh copy of the
    /// template's default fields.
    pub fn into_event(self, template: &EventTemplate) -> Result<ProbeEvent> {
        let alert_time = format_alert_time(&self.ts)?;
        let src_port = parse_port("src_port", &self.src_port)?;
        let dest_port = parse_port("dst_port", &self.dst_port)?;

        Ok(ProbeEvent {
            alert_time,
            src_addr: self.src_addr,
            src_port,
            dest_addr: self.dst_addr,
            dest_port,
            defaults: template.instantiate(),
        })
    }
}

/// Convert fractional epoch seconds to ISO-8601 UTC with second precision.
/// The fractional part is truncated, not rounded.
fn format_alert_time(ts: &str) -> Result<String> {
    let seconds: f64 = ts
        .parse()
        .map_err(|e| Error::Parse(format!("invalid timestamp '{}': {}", ts, e)))?;

    let instant = DateTime::from_timestamp(seconds.trunc() as i64, 0)
        .ok_or_else(|| Error::Parse(format!("timestamp '{}' outside calendar range", ts)))?;

    Ok(instant.format("%Y-%m-%dT%H:%M:%S").to_string())
}

/// The extraction pattern allows any 1-5 digit run; only 1-65535 is a port.
fn parse_port(field: &str, value: &str) -> Result<u16> {
    let port: u16 = value
        .parse()
        .map_err(|e| Error::Parse(format!("invalid {} '{}': {}", field, value, e)))?;

    if port == 0 {
        return Err(Error::Parse(format!("invalid {}: 0 is not a valid port", field)));
    }

    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> SigLogParser {
        SigLogParser::new().unwrap()
    }

    #[test]
    fn test_parse_well_formed_line() {
        let line = "1700000000.5 alert 10.0.0.1 443 10.0.0.2 51000 extra";

        let fields = parser().parse(line).unwrap();

        assert_eq!(fields.ts, "1700000000.5");
        assert_eq!(fields.src_addr, "10.0.0.1");
        assert_eq!(fields.src_port, "443");
        assert_eq!(fields.dst_addr, "10.0.0.2");
        assert_eq!(fields.dst_port, "51000");
    }

    #[test]
    fn test_parse_tab_separated_line() {
        let line = "1700000000.123456\tsig-match\tfe80::1\t8080\tfe80::2\t9090\ttrailing";

        let fields = parser().parse(line).unwrap();

        assert_eq!(fields.src_addr, "fe80::1");
        assert_eq!(fields.dst_port, "9090");
    }

    #[test]
    fn test_parse_rejects_malformed_line() {
        let result = parser().parse("garbage that matched the substring filter");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_integer_timestamp() {
        // The timestamp must carry a fractional component
        let result = parser().parse("1700000000 alert 10.0.0.1 443 10.0.0.2 51000");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_timestamp_mid_line() {
        // The timestamp is anchored to the start of the line
        let result = parser().parse("x 1700000000.5 alert 10.0.0.1 443 10.0.0.2 51000");
        assert!(result.is_err());
    }

    #[test]
    fn test_into_event_concrete_scenario() {
        let line = "1700000000.5 alert 10.0.0.1 443 10.0.0.2 51000 extra";
        let template = EventTemplate::new();

        let event = parser().parse(line).unwrap().into_event(&template).unwrap();

        assert_eq!(event.alert_time, "2023-11-14T22:13:20");
        assert_eq!(event.src_addr, "10.0.0.1");
        assert_eq!(event.src_port, 443);
        assert_eq!(event.dest_addr, "10.0.0.2");
        assert_eq!(event.dest_port, 51000);
    }

    #[test]
    fn test_alert_time_truncates_fraction() {
        // .999 truncates to the same second, never rounds up
        assert_eq!(
            format_alert_time("1700000000.999").unwrap(),
            "2023-11-14T22:13:20"
        );
        assert_eq!(
            format_alert_time("1700000000.001").unwrap(),
            "2023-11-14T22:13:20"
        );
    }

    #[test]
    fn test_alert_time_rejects_out_of_range_timestamp() {
        assert!(format_alert_time("99999999999999999999.0").is_err());
    }

    #[test]
    fn test_port_zero_is_rejected() {
        let line = "1700000000.5 alert 10.0.0.1 0 10.0.0.2 51000";
        let result = parser().parse(line).unwrap().into_event(&EventTemplate::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_port_above_range_is_rejected() {
        let line = "1700000000.5 alert 10.0.0.1 443 10.0.0.2 70000";
        let result = parser().parse(line).unwrap().into_event(&EventTemplate::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_into_event_carries_template_defaults() {
        let line = "1700000000.5 alert 10.0.0.1 443 10.0.0.2 51000";
        let mut template = EventTemplate::new();
        template.insert("protocol", serde_json::Value::String("tcp".to_string()));
        template.insert("sensor", serde_json::Value::String("edge-1".to_string()));

        let event = parser().parse(line).unwrap().into_event(&template).unwrap();

        assert_eq!(event.defaults.get("protocol").unwrap(), "tcp");
        assert_eq!(event.defaults.get("sensor").unwrap(), "edge-1");
    }
}
