//! Session snapshot - the read surface for external collaborators
//!
//! A snapshot captures everything the render collaborator needs in one
//! pass: the session record, every facility with its flags, and every
//! occupant with its on-demand wait clock. Times are *relative*
//! (elapsed/remaining), never absolute timestamps, so two sessions
//! started with the same configuration produce identical snapshots no
//! matter when they started — which is exactly what the reset
//! round-trip property checks through [`compute_digest`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::facility::FacilityKind;
use crate::models::occupant::OccupantState;
use crate::models::session::SessionRecord;
use crate::orchestrator::engine::{SessionController, SimulationError};

/// One facility as the render collaborator sees it
///
/// Positions are a rendering concern produced by an external layout
/// function of the stable (kind, index) pair; the core exposes only
/// the ordinals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityView {
    pub kind: FacilityKind,
    pub index: usize,
    pub occupied: bool,
    pub occupant_id: Option<u64>,
    pub out_of_order: bool,
    pub has_reward: bool,

    /// Units elapsed in the current occupancy, if occupied
    pub usage_elapsed: Option<u64>,
}

/// One occupant as the render collaborator sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupantView {
    pub id: u64,
    pub state: OccupantState,

    /// Wait budget left; frozen at the full budget once assigned
    pub time_remaining: u64,

    pub assigned_facility: Option<(FacilityKind, usize)>,
}

/// Full read-only view of one controller at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// The session-state record
    pub session: SessionRecord,

    /// All facilities, Primary before Secondary, index-ascending
    pub facilities: Vec<FacilityView>,

    /// All live occupants, id-ascending
    pub occupants: Vec<OccupantView>,
}

impl SessionSnapshot {
    /// Capture the controller's current state
    pub fn capture(controller: &SessionController) -> Self {
        let now = controller.now();

        let facilities = controller
            .pool()
            .facilities()
            .map(|facility| FacilityView {
                kind: facility.kind(),
                index: facility.index(),
                occupied: facility.is_occupied(),
                occupant_id: facility.occupant_id(),
                out_of_order: facility.is_out_of_order(),
                has_reward: facility.has_reward(),
                usage_elapsed: facility.usage_elapsed(now),
            })
            .collect();

        let occupants = controller
            .queue()
            .occupants()
            .iter()
            .map(|occupant| OccupantView {
                id: occupant.id(),
                state: occupant.state(),
                time_remaining: occupant.time_remaining(now),
                assigned_facility: occupant.assigned_facility(),
            })
            .collect();

        Self {
            session: controller.session().clone(),
            facilities,
            occupants,
        }
    }

    /// SHA256 digest of this snapshot
    pub fn digest(&self) -> Result<String, SimulationError> {
        compute_digest(self)
    }
}

impl SessionController {
    /// Capture a [`SessionSnapshot`] of this controller
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }
}

/// Compute a deterministic SHA256 hash of any serializable value
///
/// Uses canonical JSON with recursively sorted object keys, so the
/// digest is stable regardless of map iteration order.
pub fn compute_digest<T: Serialize>(value: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(value).map_err(|e| {
        SimulationError::SerializationError(format!("snapshot serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let canonical = canonicalize(value);
    let json = serde_json::to_string(&canonical).map_err(|e| {
        SimulationError::SerializationError(format!("snapshot serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
