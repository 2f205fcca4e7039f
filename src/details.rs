use crate::types::{PointRecord, UNKNOWN_LABEL};
use serde::Serialize;

const COLLISION_TYPE: &str = "COLLISIONTYPE";
const SEVERITY: &str = "SEVERITYDESC";
const INCIDENT_DATETIME: &str = "INCDTTM";
const INCIDENT_DATE: &str = "INCDATE";
const LOCATION: &str = "LOCATION";
const REPORT_NUMBER: &str = "REPORTNO";

const NO_REPORT: &str = "N/A";

/// What a picked collision shows: SDOT attributes with display fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollisionDetails {
    /// `[lon, lat]`
    pub coordinates: Option<[f64; 2]>,
    pub collision_type: String,
    pub severity: String,
    pub when: String,
    pub location: String,
    pub report: String,
}

impl CollisionDetails {
    pub fn from_record(record: &PointRecord) -> Self {
        let or_unknown = |name: &str| record.attribute(name).unwrap_or(UNKNOWN_LABEL).to_string();

        Self {
            coordinates: record.coordinate().map(|p| [p.x(), p.y()]),
            collision_type: or_unknown(COLLISION_TYPE),
            severity: or_unknown(SEVERITY),
            when: record
                .attribute(INCIDENT_DATETIME)
                .or_else(|| record.attribute(INCIDENT_DATE))
                .unwrap_or(UNKNOWN_LABEL)
                .to_string(),
            location: or_unknown(LOCATION),
            report: record.attribute(REPORT_NUMBER).unwrap_or(NO_REPORT).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_record() {
        let record = PointRecord::at(-122.33, 47.61)
            .with_attribute(COLLISION_TYPE, "Rear Ended")
            .with_attribute(SEVERITY, "Injury Collision")
            .with_attribute(INCIDENT_DATETIME, "1/5/2024 5:40:00 PM")
            .with_attribute(INCIDENT_DATE, "2024/01/05")
            .with_attribute(LOCATION, "AURORA AVE N AND N 85TH ST")
            .with_attribute(REPORT_NUMBER, "E1234567");

        let details = CollisionDetails::from_record(&record);
        assert_eq!(details.coordinates, Some([-122.33, 47.61]));
        assert_eq!(details.collision_type, "Rear Ended");
        assert_eq!(details.severity, "Injury Collision");
        assert_eq!(details.when, "1/5/2024 5:40:00 PM");
        assert_eq!(details.location, "AURORA AVE N AND N 85TH ST");
        assert_eq!(details.report, "E1234567");
    }

    #[test]
    fn test_fallbacks() {
        let record = PointRecord::at(0.0, 0.0).with_attribute(INCIDENT_DATETIME, "");
        let details = CollisionDetails::from_record(&record);
        assert_eq!(details.collision_type, UNKNOWN_LABEL);
        assert_eq!(details.severity, UNKNOWN_LABEL);
        assert_eq!(details.when, UNKNOWN_LABEL);
        assert_eq!(details.location, UNKNOWN_LABEL);
        assert_eq!(details.report, "N/A");
    }

    #[test]
    fn test_date_used_when_datetime_missing() {
        let record = PointRecord::at(0.0, 0.0).with_attribute(INCIDENT_DATE, "2024/03/09");
        assert_eq!(CollisionDetails::from_record(&record).when, "2024/03/09");
    }
}
