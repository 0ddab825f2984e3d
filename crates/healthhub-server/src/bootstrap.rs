//! First-start seeding: the default hospital, the admin account and its
//! bearer token.
//!
//! The in-memory backend starts empty on every boot, so seeding always
//! runs; a persistent backend would make this idempotent by lookup.

use healthhub_core::{Hospital, Principal, Role, RoleProfile, User};
use healthhub_storage::DynRegistryStorage;

use crate::config::AppConfig;

pub struct Seeded {
    pub hospital: Hospital,
    pub admin: User,
}

pub async fn seed(registry: &DynRegistryStorage, config: &AppConfig) -> anyhow::Result<Seeded> {
    let hospital = Hospital::new(
        config.bootstrap.hospital_name.clone(),
        config.bootstrap.hospital_place.clone(),
    );
    registry.insert_hospital(&hospital).await?;

    let (admin, profile) = Principal::create(
        config.bootstrap.admin_username.clone(),
        Role::Admin,
        hospital.id,
        RoleProfile::Admin,
    )?;
    registry.insert_principal(&admin, &profile).await?;
    registry
        .insert_token(&config.auth.admin_token, admin.principal())
        .await?;

    tracing::info!(
        hospital = %hospital.name,
        admin = %admin.username,
        "bootstrap data seeded"
    );
    Ok(Seeded { hospital, admin })
}
