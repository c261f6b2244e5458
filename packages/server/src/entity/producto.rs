use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "producto")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub trabajador_id: i32,
    #[sea_orm(belongs_to, from = "trabajador_id", to = "id")]
    pub trabajador: HasOne<super::trabajador::Entity>,

    pub titulo: String,

    /// One of the fixed category names, validated at the model layer.
    pub categoria: String,
    pub descripcion: String,

    /// Relative path into the blob store, if an image was uploaded.
    pub imagen: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
