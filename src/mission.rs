//! Mission metadata (flavour text shown by the host's briefing screens).
//!
//! The simulation never reads these fields; it only stores the record for the
//! current mission so the host can display it.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{SimError, SimResult};

#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionIntel {
    pub operation_name: String,
    pub briefing: String,
    pub objective: String,
    pub difficulty: String,
}

impl Default for MissionIntel {
    fn default() -> Self {
        Self {
            operation_name: "Operation: Silent Echo".into(),
            briefing: "Hostiles have occupied the sector. Eliminate all threats. \
                       Intelligence suggests heavy resistance."
                .into(),
            objective: "Survive as long as possible.".into(),
            difficulty: "Standard".into(),
        }
    }
}

impl MissionIntel {
    /// Record used when the host has no way to reach its intel service.
    pub fn offline() -> Self {
        Self {
            operation_name: "Operation: Offline Protocol".into(),
            briefing: "Network connection to HQ severed. Proceed with standard containment \
                       protocols. Eliminate all hostiles in the AO."
                .into(),
            objective: "Survive the horde.".into(),
            difficulty: "Offline Mode".into(),
        }
    }

    /// Record used when the intel service answered with something unusable.
    pub fn fallback() -> Self {
        Self {
            operation_name: "Operation: Fallback".into(),
            briefing: "Intelligence feed interrupted. Hostiles inbound. Weapons free.".into(),
            objective: "Survive.".into(),
            difficulty: "Hardened".into(),
        }
    }

    /// Parse the JSON record produced by the intel service.
    pub fn from_json(json: &str) -> SimResult<Self> {
        serde_json::from_str(json).map_err(SimError::MissionIntel)
    }

    /// Always produce a usable record: parse `json` if present, otherwise or
    /// on failure fall back to the default briefing.
    pub fn resolve(json: Option<&str>) -> Self {
        match json.map(Self::from_json) {
            Some(Ok(intel)) => intel,
            Some(Err(err)) => {
                warn!(error = %err, "mission intel unusable, using default briefing");
                Self::default()
            }
            None => {
                warn!("no mission intel supplied, using default briefing");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_service_json() {
        let json = r#"{
            "operationName": "Operation: Iron Veil",
            "briefing": "Hold the square.",
            "objective": "Survive.",
            "difficulty": "Veteran"
        }"#;
        let intel = MissionIntel::from_json(json).unwrap();
        assert_eq!(intel.operation_name, "Operation: Iron Veil");
        assert_eq!(intel.difficulty, "Veteran");
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        assert_eq!(MissionIntel::resolve(None), MissionIntel::default());
        assert_eq!(MissionIntel::resolve(Some("{\"briefing\": 3}")), MissionIntel::default());
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let err = MissionIntel::from_json(r#"{"operationName": "x"}"#).unwrap_err();
        assert!(matches!(err, SimError::MissionIntel(_)));
    }
}
