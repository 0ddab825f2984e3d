//! Shared fixture for the engine tests: one hospital with a full staff
//! roster and a registered patient assigned to the doctor.

use std::sync::Arc;

use healthhub_core::{
    DoctorProfile, Hospital, MedicalRecord, NurseProfile, Patient, Principal, Role, RoleProfile,
    Shift, TechProfile, User, UserId,
};
use healthhub_db_memory::InMemoryStorage;
use healthhub_storage::RegistryStorage;
use time::OffsetDateTime;

use crate::engine::WorkflowEngine;

pub(crate) struct Fixture {
    pub storage: Arc<InMemoryStorage>,
    pub doctor: User,
    pub nurse: User,
    pub lab_tech: User,
    pub radiologist: User,
    pub patient: Patient,
    pub record: MedicalRecord,
}

impl Fixture {
    pub fn engine(&self) -> WorkflowEngine {
        WorkflowEngine::new(self.storage.clone(), self.storage.clone())
    }

    pub fn clinical(&self) -> Arc<InMemoryStorage> {
        self.storage.clone()
    }
}

fn tech_profile(specialty: &str) -> TechProfile {
    TechProfile {
        shift: Shift::Day,
        specialty: specialty.into(),
        phone: "0555".into(),
        pending_tests: 0,
    }
}

async fn seed_user(
    storage: &InMemoryStorage,
    username: &str,
    role: Role,
    hospital: &Hospital,
    profile: RoleProfile,
) -> User {
    let (user, profile) = Principal::create(username, role, hospital.id, profile).unwrap();
    storage.insert_principal(&user, &profile).await.unwrap();
    user
}

pub(crate) async fn fixture() -> Fixture {
    let storage = Arc::new(InMemoryStorage::new());
    let hospital = Hospital::new("CHU Central", "Lyon");
    storage.insert_hospital(&hospital).await.unwrap();

    let doctor = seed_user(
        &storage,
        "dr.amrani",
        Role::Doctor,
        &hospital,
        RoleProfile::Doctor(DoctorProfile {
            specialty: "generaliste".into(),
            phone: "0555".into(),
        }),
    )
    .await;
    let nurse = seed_user(
        &storage,
        "inf.martin",
        Role::Nurse,
        &hospital,
        RoleProfile::Nurse(NurseProfile {
            shift: Shift::Night,
            specialty: "urgences".into(),
            phone: "0555".into(),
        }),
    )
    .await;
    let lab_tech = seed_user(
        &storage,
        "lt.kaci",
        Role::LabTech,
        &hospital,
        RoleProfile::LabTech(tech_profile("biochemistry")),
    )
    .await;
    let radiologist = seed_user(
        &storage,
        "rad.dubois",
        Role::Radiologist,
        &hospital,
        RoleProfile::Radiologist(tech_profile("imaging")),
    )
    .await;

    let patient_id = UserId::new();
    let patient = Patient {
        user_id: patient_id,
        national_health_id: 184_07_69_222_333,
        first_name: "Omar".into(),
        last_name: "Haddad".into(),
        birth_date: OffsetDateTime::now_utc(),
        address: "12 rue des Lilas".into(),
        phone: "0600000000".into(),
        insurer: "CPAM".into(),
        emergency_contact: "0611111111".into(),
        assigned_doctor_id: Some(doctor.id),
        hospital_id: hospital.id,
        created_at: OffsetDateTime::now_utc(),
    };
    let record = MedicalRecord::for_patient(patient_id);
    storage.insert_patient(&patient, &record).await.unwrap();

    Fixture {
        storage,
        doctor,
        nurse,
        lab_tech,
        radiologist,
        patient,
        record,
    }
}
