//! Wire types spoken between the panel and the light service
use serde::{Deserialize, Serialize};

/// The reported state of the light system.
///
/// This is the body of `GET /api/system/status`. A brightness of 0 means
/// there is no meaningful reading to display.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    /// Is the light currently on?
    pub light_on: bool,

    /// The last brightness reading, in lux.
    pub brightness: u32,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_names() {
        let status = SystemStatus {
            light_on: true,
            brightness: 80,
        };
        let json = json!({
            "lightOn": true,
            "brightness": 80,
        });
        assert_eq!(json, serde_json::to_value(status).unwrap());
    }

    #[test]
    fn test_status_parse() {
        let status: SystemStatus =
            serde_json::from_value(json!({"lightOn": false, "brightness": 0})).unwrap();
        assert_eq!(
            status,
            SystemStatus {
                light_on: false,
                brightness: 0
            }
        );
    }

    #[test]
    fn test_status_parse_rejects_wrong_shape() {
        let result: Result<SystemStatus, _> =
            serde_json::from_value(json!({"light_on": false, "brightness": 0}));
        assert!(result.is_err());

        let result: Result<SystemStatus, _> =
            serde_json::from_value(json!({"lightOn": "yes", "brightness": 0}));
        assert!(result.is_err());
    }
}
