use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set};
use tracing::info;

use crate::config::AuthConfig;
use crate::entity::trabajador;
use crate::utils::hash;

/// Seed the administrator trabajador from configuration, if one is set.
///
/// Idempotent: an existing account with the same usuario is left untouched.
pub async fn seed_admin(db: &DatabaseConnection, auth: &AuthConfig) -> anyhow::Result<()> {
    let Some(admin) = &auth.admin else {
        return Ok(());
    };

    let model = trabajador::ActiveModel {
        usuario: Set(admin.usuario.clone()),
        password: Set(hash::hash_password(&admin.password)?),
        nombre_completo: Set("Administrador".to_string()),
        apellidos: Set("General".to_string()),
        dni: Set("00000000".to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = trabajador::Entity::insert(model)
        .on_conflict(
            OnConflict::column(trabajador::Column::Usuario)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(_) => {
            info!("Seeded admin trabajador '{}'", admin.usuario);
            Ok(())
        }
        Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
