//! Access policy engine.
//!
//! One total function from (principal, patient) to a decision. Rules are
//! evaluated in a fixed order and the first match wins; every pair yields
//! exactly one allow or deny, never a silent empty result.

use healthhub_core::{Patient, Principal, Role, UserId};
use serde::Serialize;

/// Which rule granted access. Carried in logs so an audit can tell an
/// admin override from ordinary same-hospital access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessGrant {
    AdminOverride,
    SelfAccess,
    AssignedDoctor,
    SameHospitalStaff,
}

/// Structured denial. Kept distinct from `NotFound` internally; handlers
/// decide how it surfaces on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenyReason {
    pub role: Role,
    pub user_id: UserId,
    pub patient_id: UserId,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} may not access patient {}",
            self.role, self.user_id, self.patient_id
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow(AccessGrant),
    Deny(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

/// Evaluates the access rules, in order:
///
/// 1. admins see everything;
/// 2. patients see themselves;
/// 3. the assigned doctor sees their patient;
/// 4. clinical staff see patients of their own hospital;
/// 5. everything else is denied.
pub fn evaluate(principal: Principal, patient: &Patient) -> AccessDecision {
    use AccessGrant::*;

    let decision = match principal.role {
        Role::Admin => AccessDecision::Allow(AdminOverride),
        Role::Patient if principal.user_id == patient.user_id => AccessDecision::Allow(SelfAccess),
        Role::Doctor if patient.assigned_doctor_id == Some(principal.user_id) => {
            AccessDecision::Allow(AssignedDoctor)
        }
        Role::Doctor | Role::Nurse | Role::LabTech | Role::Radiologist | Role::Pharmacist
            if principal.hospital_id == patient.hospital_id =>
        {
            AccessDecision::Allow(SameHospitalStaff)
        }
        role => AccessDecision::Deny(DenyReason {
            role,
            user_id: principal.user_id,
            patient_id: patient.user_id,
        }),
    };

    match &decision {
        AccessDecision::Allow(grant) => {
            tracing::debug!(
                user_id = %principal.user_id,
                role = %principal.role,
                patient_id = %patient.user_id,
                grant = ?grant,
                "access granted"
            );
        }
        AccessDecision::Deny(reason) => {
            tracing::info!(
                user_id = %principal.user_id,
                role = %principal.role,
                patient_id = %patient.user_id,
                reason = %reason,
                "access denied"
            );
        }
    }
    decision
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthhub_core::HospitalId;
    use time::OffsetDateTime;

    fn patient(hospital_id: HospitalId, assigned_doctor_id: Option<UserId>) -> Patient {
        Patient {
            user_id: UserId::new(),
            national_health_id: 175_03_99_123_456,
            first_name: "Nadia".into(),
            last_name: "Benali".into(),
            birth_date: OffsetDateTime::now_utc(),
            address: "12 rue des Lilas".into(),
            phone: "0600000000".into(),
            insurer: "CPAM".into(),
            emergency_contact: "0611111111".into(),
            assigned_doctor_id,
            hospital_id,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn principal(role: Role, hospital_id: HospitalId) -> Principal {
        Principal {
            user_id: UserId::new(),
            role,
            hospital_id,
        }
    }

    #[test]
    fn admin_sees_everything() {
        let p = patient(HospitalId::new(), None);
        let admin = principal(Role::Admin, HospitalId::new());
        assert_eq!(
            evaluate(admin, &p),
            AccessDecision::Allow(AccessGrant::AdminOverride)
        );
    }

    #[test]
    fn patient_sees_only_themselves() {
        let hospital = HospitalId::new();
        let p = patient(hospital, None);
        let me = Principal {
            user_id: p.user_id,
            role: Role::Patient,
            hospital_id: hospital,
        };
        assert!(evaluate(me, &p).is_allowed());

        // another patient of the same hospital is denied
        let other = principal(Role::Patient, hospital);
        assert!(!evaluate(other, &p).is_allowed());
    }

    #[test]
    fn assigned_doctor_beats_hospital_scoping() {
        let doctor = principal(Role::Doctor, HospitalId::new());
        // patient at a different hospital, but assigned to this doctor
        let p = patient(HospitalId::new(), Some(doctor.user_id));
        assert_eq!(
            evaluate(doctor, &p),
            AccessDecision::Allow(AccessGrant::AssignedDoctor)
        );
    }

    #[test]
    fn staff_are_scoped_to_their_hospital() {
        let hospital = HospitalId::new();
        let p = patient(hospital, None);
        for role in [
            Role::Doctor,
            Role::Nurse,
            Role::LabTech,
            Role::Radiologist,
            Role::Pharmacist,
        ] {
            assert_eq!(
                evaluate(principal(role, hospital), &p),
                AccessDecision::Allow(AccessGrant::SameHospitalStaff),
                "{role} should see own-hospital patients"
            );
            assert!(
                !evaluate(principal(role, HospitalId::new()), &p).is_allowed(),
                "{role} should not see other-hospital patients"
            );
        }
    }

    #[test]
    fn denial_names_the_actor_and_target() {
        let p = patient(HospitalId::new(), None);
        let nurse = principal(Role::Nurse, HospitalId::new());
        let AccessDecision::Deny(reason) = evaluate(nurse, &p) else {
            panic!("expected denial");
        };
        assert_eq!(reason.role, Role::Nurse);
        assert_eq!(reason.user_id, nurse.user_id);
        assert_eq!(reason.patient_id, p.user_id);
    }

    #[test]
    fn every_role_yields_a_decision() {
        let p = patient(HospitalId::new(), None);
        for role in Role::ALL {
            // totality: no role panics or falls through
            let _ = evaluate(principal(role, HospitalId::new()), &p);
        }
    }
}
