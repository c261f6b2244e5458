use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::shared::{Pagination, validate_required_max};

/// Fixed product categories offered by the pharmacy.
pub const CATEGORIAS: &[&str] = &[
    "Medicamentos",
    "Vitaminas",
    "Cuidado Personal",
    "Primeros Auxilios",
    "Suplementos",
];

/// Sentinel category value meaning "no filter".
pub const CATEGORIA_TODOS: &str = "todos";

/// Text fields of a product create/update form.
pub struct ProductoForm {
    pub titulo: String,
    pub categoria: String,
    pub descripcion: String,
}

pub fn validate_producto_form(form: &ProductoForm) -> Result<(), AppError> {
    validate_required_max(&form.titulo, "titulo", 255)?;
    if !CATEGORIAS.contains(&form.categoria.trim()) {
        return Err(AppError::Validation(format!(
            "La categoria debe ser una de: {}",
            CATEGORIAS.join(", ")
        )));
    }
    if form.descripcion.trim().is_empty() {
        return Err(AppError::Validation(
            "El campo descripcion es obligatorio".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductoResponse {
    pub id: i32,
    pub trabajador_id: i32,
    pub titulo: String,
    pub categoria: String,
    pub descripcion: String,
    /// Relative path of the uploaded image, servable under `/api/v1/uploads/`.
    pub imagen: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::producto::Model> for ProductoResponse {
    fn from(m: crate::entity::producto::Model) -> Self {
        Self {
            id: m.id,
            trabajador_id: m.trabajador_id,
            titulo: m.titulo,
            categoria: m.categoria,
            descripcion: m.descripcion,
            imagen: m.imagen,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductoListResponse {
    pub data: Vec<ProductoResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ProductoListQuery {
    /// Page number (1-based).
    pub page: Option<u64>,
    /// Items per page (1-100).
    pub per_page: Option<u64>,
    /// Case-insensitive substring match over titulo and descripcion.
    pub search: Option<String>,
    /// Category equality filter; `todos` (or absent) means no filter.
    pub categoria: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ProductoForm {
        ProductoForm {
            titulo: "Paracetamol 500mg".into(),
            categoria: "Medicamentos".into(),
            descripcion: "Analgésico y antipirético.".into(),
        }
    }

    #[test]
    fn accepts_a_valid_form() {
        assert!(validate_producto_form(&valid_form()).is_ok());
    }

    #[test]
    fn every_declared_categoria_is_accepted() {
        for categoria in CATEGORIAS {
            let mut form = valid_form();
            form.categoria = categoria.to_string();
            assert!(validate_producto_form(&form).is_ok(), "{categoria}");
        }
    }

    #[test]
    fn rejects_unknown_categoria() {
        let mut form = valid_form();
        form.categoria = "Cosméticos".into();
        assert!(validate_producto_form(&form).is_err());
    }

    #[test]
    fn rejects_empty_descripcion() {
        let mut form = valid_form();
        form.descripcion = " ".into();
        assert!(validate_producto_form(&form).is_err());
    }

    #[test]
    fn rejects_overlong_titulo() {
        let mut form = valid_form();
        form.titulo = "x".repeat(256);
        assert!(validate_producto_form(&form).is_err());
    }
}
