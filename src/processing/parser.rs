//! Parsing of scan output into signal strength readings

use crate::core::Reading;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while parsing readings
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Invalid readings format: {details}")]
    InvalidFormat { details: String },
    #[error("Invalid reading #{index}: {details}")]
    InvalidReading { index: usize, details: String },
}

/// Shapes accepted for a readings document
#[derive(Deserialize)]
#[serde(untagged)]
enum ReadingsDocument {
    List(Vec<Reading>),
    Wrapped { readings: Vec<Reading> },
}

/// Parse readings from JSON: either `[{"id": .., "rssi": ..}, ..]` or
/// `{"readings": [..]}`
pub fn parse_readings_json(content: &str) -> Result<Vec<Reading>, ParseError> {
    let document: ReadingsDocument =
        serde_json::from_str(content).map_err(|e| ParseError::InvalidFormat {
            details: e.to_string(),
        })?;

    let readings = match document {
        ReadingsDocument::List(readings) => readings,
        ReadingsDocument::Wrapped { readings } => readings,
    };

    for (index, reading) in readings.iter().enumerate() {
        if reading.id.trim().is_empty() {
            return Err(ParseError::InvalidReading {
                index,
                details: "empty identifier".to_string(),
            });
        }
    }

    Ok(readings)
}

/// Parse the tabular listing printed by `airport -s`.
///
/// Each network row carries `SSID BSSID RSSI CHANNEL ...`. SSIDs may contain
/// spaces, so rows are anchored on the BSSID token and the signal strength is
/// the token right after it. Rows without a BSSID (the header, blank lines)
/// are skipped; rows with an unreadable RSSI are skipped with a warning.
pub fn parse_airport_listing(listing: &str) -> Vec<Reading> {
    let mut readings = Vec::new();

    for (line_number, line) in listing.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        let Some(bssid) = tokens.by_ref().find(|token| is_bssid(token)) else {
            continue;
        };

        match tokens.next().map(str::parse::<f64>) {
            Some(Ok(rssi)) => readings.push(Reading::new(bssid, rssi)),
            _ => warn!(
                line = line_number + 1,
                bssid, "skipping airport row without a numeric RSSI"
            ),
        }
    }

    debug!(count = readings.len(), "parsed airport listing");
    readings
}

/// Parse scanner output, failing when network rows exist but none is readable.
///
/// An empty listing (no networks in range) is a valid, empty scan.
pub fn parse_airport_scan(listing: &str) -> Result<Vec<Reading>, ParseError> {
    let readings = parse_airport_listing(listing);
    if readings.is_empty() {
        let rows = listing
            .lines()
            .filter(|line| line.split_whitespace().any(is_bssid))
            .count();
        if rows > 0 {
            return Err(ParseError::InvalidFormat {
                details: format!("none of {} airport rows has a numeric RSSI", rows),
            });
        }
    }
    Ok(readings)
}

/// Auto-detect JSON or an airport listing
pub fn parse_readings(content: &str) -> Result<Vec<Reading>, ParseError> {
    match content.trim_start().chars().next() {
        Some('[') | Some('{') => parse_readings_json(content),
        _ => Ok(parse_airport_listing(content)),
    }
}

/// Six colon-separated hex octets; airport drops leading zeros, so 1-2 digits each
pub fn is_bssid(token: &str) -> bool {
    let octets: Vec<&str> = token.split(':').collect();
    octets.len() == 6
        && octets
            .iter()
            .all(|o| (1..=2).contains(&o.len()) && o.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
                            SSID BSSID             RSSI CHANNEL HT CC SECURITY (auth/unicast/group)
                      Office 2G a4:2b:b0:0:1:1     -48  6       Y  JP WPA2(PSK/AES/AES)
                     guest-net a4:2b:b0:00:01:02 -61  11      Y  JP NONE
                       Printer 10:9a:dd:4f:00:aa -75  1,+1    Y  -- WPA2(PSK/AES/AES)
                        broken 10:9a:dd:4f:00:ab n/a  1       Y  -- NONE
";

    #[test]
    fn test_parse_airport_listing() {
        let readings = parse_airport_listing(LISTING);

        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0], Reading::new("a4:2b:b0:0:1:1", -48.0));
        assert_eq!(readings[1], Reading::new("a4:2b:b0:00:01:02", -61.0));
        assert_eq!(readings[2], Reading::new("10:9a:dd:4f:00:aa", -75.0));
    }

    #[test]
    fn test_parse_empty_listing() {
        assert!(parse_airport_listing("").is_empty());
        assert!(parse_airport_listing("No networks found\n").is_empty());
    }

    #[test]
    fn test_parse_airport_scan() {
        assert_eq!(parse_airport_scan(LISTING).unwrap().len(), 3);
        assert_eq!(parse_airport_scan(""), Ok(Vec::new()));

        let unreadable = "SSID BSSID RSSI\nlab 00:11:22:33:44:55 ?? 6\nlab2 00:11:22:33:44:56 -- 6\n";
        assert_eq!(
            parse_airport_scan(unreadable),
            Err(ParseError::InvalidFormat {
                details: "none of 2 airport rows has a numeric RSSI".to_string()
            })
        );
    }

    #[test]
    fn test_bssid_detection() {
        assert!(is_bssid("00:11:22:33:44:55"));
        assert!(is_bssid("a4:2b:b0:0:1:1"));
        assert!(!is_bssid("00:11:22:33:44"));
        assert!(!is_bssid("00:11:22:33:44:5g"));
        assert!(!is_bssid("WPA2(PSK/AES/AES)"));
        assert!(!is_bssid("000:11:22:33:44:55"));
    }

    #[test]
    fn test_parse_readings_json_list() {
        let readings =
            parse_readings_json(r#"[{"id": "ap-1", "rssi": -40}, {"id": "ap-2", "rssi": -52.5}]"#)
                .unwrap();
        assert_eq!(readings, vec![Reading::new("ap-1", -40.0), Reading::new("ap-2", -52.5)]);
    }

    #[test]
    fn test_parse_readings_json_wrapped() {
        let readings = parse_readings_json(r#"{"readings": [{"id": "ap-1", "rssi": -40}]}"#).unwrap();
        assert_eq!(readings.len(), 1);
    }

    #[test]
    fn test_parse_readings_json_errors() {
        assert!(matches!(
            parse_readings_json("not json"),
            Err(ParseError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_readings_json(r#"[{"id": "ap-1"}]"#),
            Err(ParseError::InvalidFormat { .. })
        ));
        assert_eq!(
            parse_readings_json(r#"[{"id": "ap-1", "rssi": -40}, {"id": " ", "rssi": -50}]"#),
            Err(ParseError::InvalidReading {
                index: 1,
                details: "empty identifier".to_string()
            })
        );
    }

    #[test]
    fn test_parse_readings_detects_format() {
        assert_eq!(parse_readings(LISTING).unwrap().len(), 3);
        assert_eq!(
            parse_readings("  [{\"id\": \"x\", \"rssi\": -30}]").unwrap(),
            vec![Reading::new("x", -30.0)]
        );
    }
}
