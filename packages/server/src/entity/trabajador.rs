use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Staff identity that authors content. Single guard, no roles.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trabajador")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub usuario: String,

    /// Argon2 PHC-format password hash.
    pub password: String,

    pub nombre_completo: String,
    pub apellidos: String,
    pub dni: String,

    #[sea_orm(has_many)]
    pub blogs: HasMany<super::blog::Entity>,

    #[sea_orm(has_many)]
    pub productos: HasMany<super::producto::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
