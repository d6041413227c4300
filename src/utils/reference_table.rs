//! Identifier → position lookup for access points

use crate::core::{Position, ReferencePoint};
use crate::processing::parser::is_bssid;
use crate::utils::config::ConfigError;
use std::collections::HashMap;

/// Canonical form of a reference identifier.
///
/// Identifiers compare case-insensitively. BSSIDs also get every octet
/// zero-padded, since `airport` prints `a4:2b:b0:0:0:1` for `a4:2b:b0:00:00:01`.
pub fn normalize_id(id: &str) -> String {
    let id = id.trim().to_ascii_lowercase();
    if !is_bssid(&id) {
        return id;
    }
    id.split(':')
        .map(|octet| format!("{:0>2}", octet))
        .collect::<Vec<_>>()
        .join(":")
}

/// Immutable table of reference points, shared read-only across positioning runs
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    points: HashMap<String, ReferencePoint>,
}

impl ReferenceTable {
    /// Build a table, rejecting duplicate identifiers and non-finite coordinates
    pub fn from_points<I>(points: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = ReferencePoint>,
    {
        let mut table = HashMap::new();

        for point in points {
            let key = normalize_id(&point.id);
            if key.is_empty() {
                return Err(ConfigError::InvalidParameter {
                    parameter: "reference_points.id".to_string(),
                    value: point.id,
                    reason: "Identifier must not be empty".to_string(),
                });
            }
            if !point.position.is_finite() {
                return Err(ConfigError::InvalidParameter {
                    parameter: format!("reference_points[{}].position", point.id),
                    value: point.position.to_string(),
                    reason: "Coordinates must be finite".to_string(),
                });
            }
            if table.contains_key(&key) {
                return Err(ConfigError::DuplicateReference { id: point.id });
            }
            table.insert(key, point);
        }

        Ok(Self { points: table })
    }

    pub fn get(&self, id: &str) -> Option<&ReferencePoint> {
        self.points.get(&normalize_id(id))
    }

    pub fn position_of(&self, id: &str) -> Option<Position> {
        self.get(id).map(|point| point.position)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.points.contains_key(&normalize_id(id))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Reference points ordered by identifier
    pub fn points(&self) -> Vec<&ReferencePoint> {
        let mut points: Vec<_> = self.points.values().collect();
        points.sort_by(|a, b| normalize_id(&a.id).cmp(&normalize_id(&b.id)));
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office() -> Vec<ReferencePoint> {
        vec![
            ReferencePoint::new("AA:BB:CC:00:00:01", Position::new(6.0, 6.0)),
            ReferencePoint::new("aa:bb:cc:00:00:02", Position::new(15.0, 5.7)),
            ReferencePoint::new("aa:bb:cc:00:00:03", Position::new(10.0, 10.0)),
        ]
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = ReferenceTable::from_points(office()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.position_of("aa:bb:cc:00:00:01"), Some(Position::new(6.0, 6.0)));
        assert_eq!(table.position_of(" AA:BB:CC:00:00:02 "), Some(Position::new(15.0, 5.7)));
        assert!(table.get("aa:bb:cc:00:00:04").is_none());
        assert!(!table.contains("unknown"));
    }

    #[test]
    fn test_normalize_pads_bssid_octets() {
        assert_eq!(normalize_id("A4:2B:B0:0:0:1"), "a4:2b:b0:00:00:01");
        assert_eq!(normalize_id(" a4:2b:b0:00:00:01 "), "a4:2b:b0:00:00:01");
        assert_eq!(normalize_id("Lobby-AP"), "lobby-ap");
        assert_eq!(normalize_id("1:2:3"), "1:2:3");
    }

    #[test]
    fn test_short_octets_match_padded_entry() {
        let table = ReferenceTable::from_points(office()).unwrap();
        assert_eq!(table.position_of("aa:bb:cc:0:0:2"), Some(Position::new(15.0, 5.7)));

        let mut points = office();
        points.push(ReferencePoint::new("aa:bb:cc:0:0:1", Position::new(1.0, 1.0)));
        assert!(matches!(
            ReferenceTable::from_points(points),
            Err(ConfigError::DuplicateReference { .. })
        ));
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let mut points = office();
        points.push(ReferencePoint::new("AA:BB:CC:00:00:03", Position::new(1.0, 1.0)));

        match ReferenceTable::from_points(points) {
            Err(ConfigError::DuplicateReference { id }) => assert_eq!(id, "AA:BB:CC:00:00:03"),
            other => panic!("Expected DuplicateReference, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_points_rejected() {
        let nan = vec![ReferencePoint::new("a", Position::new(f64::NAN, 0.0))];
        assert!(ReferenceTable::from_points(nan).is_err());

        let blank = vec![ReferencePoint::new("  ", Position::new(0.0, 0.0))];
        assert!(ReferenceTable::from_points(blank).is_err());
    }

    #[test]
    fn test_points_sorted_by_identifier() {
        let table = ReferenceTable::from_points(office().into_iter().rev()).unwrap();
        let ids: Vec<_> = table.points().iter().map(|p| normalize_id(&p.id)).collect();
        assert_eq!(ids, vec!["aa:bb:cc:00:00:01", "aa:bb:cc:00:00:02", "aa:bb:cc:00:00:03"]);
    }
}
