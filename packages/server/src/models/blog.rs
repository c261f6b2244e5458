use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::shared::{Pagination, validate_required_max};

/// Minimum length of `contenido` in characters.
pub const MIN_CONTENIDO_CHARS: usize = 20;

/// Text fields of a blog create/update form.
pub struct BlogForm {
    pub titulo: String,
    pub subtitulo: String,
    pub contenido: String,
}

pub fn validate_blog_form(form: &BlogForm) -> Result<(), AppError> {
    validate_required_max(&form.titulo, "titulo", 255)?;
    validate_required_max(&form.subtitulo, "subtitulo", 255)?;
    if form.contenido.trim().chars().count() < MIN_CONTENIDO_CHARS {
        return Err(AppError::Validation(format!(
            "El campo contenido debe tener al menos {MIN_CONTENIDO_CHARS} caracteres"
        )));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct BlogResponse {
    pub id: i32,
    pub trabajador_id: i32,
    pub titulo: String,
    pub subtitulo: String,
    pub contenido: String,
    /// Relative path of the uploaded image, servable under `/api/v1/uploads/`.
    pub imagen: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::blog::Model> for BlogResponse {
    fn from(m: crate::entity::blog::Model) -> Self {
        Self {
            id: m.id,
            trabajador_id: m.trabajador_id,
            titulo: m.titulo,
            subtitulo: m.subtitulo,
            contenido: m.contenido,
            imagen: m.imagen,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct BlogListResponse {
    pub data: Vec<BlogResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct BlogListQuery {
    /// Page number (1-based).
    pub page: Option<u64>,
    /// Items per page (1-100).
    pub per_page: Option<u64>,
}
