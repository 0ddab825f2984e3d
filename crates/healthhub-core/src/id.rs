//! Typed identifiers for domain entities.
//!
//! Every entity carries its own UUID newtype so a consultation id can never
//! be passed where an exam id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(
    /// Identifier of a user account (any role, patients included).
    UserId
);
entity_id!(
    /// Identifier of a hospital.
    HospitalId
);
entity_id!(
    /// Identifier of a medical record (dossier).
    RecordId
);
entity_id!(
    /// Identifier of a consultation.
    ConsultationId
);
entity_id!(
    /// Identifier of an exam.
    ExamId
);
entity_id!(
    /// Identifier of a prescription.
    OrdonnanceId
);
entity_id!(
    /// Identifier of a medication catalog entry.
    MedicationId
);
entity_id!(
    /// Identifier of a laboratory result.
    LabResultId
);
entity_id!(
    /// Identifier of a radiology result.
    RadiologyResultId
);
entity_id!(
    /// Identifier of a health metric measurement.
    MetricId
);
entity_id!(
    /// Identifier of a nurse care activity.
    ActivityId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_display_and_parse() {
        let id = UserId::new();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn serde_is_transparent() {
        let id = ExamId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: ExamId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("not-a-uuid".parse::<RecordId>().is_err());
    }
}
