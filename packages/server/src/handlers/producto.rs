use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use sea_orm::sea_query::{Expr, ExprTrait, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::instrument;

use crate::entity::producto;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::forms::{discard_image, read_content_form};
use crate::models::producto::{
    CATEGORIA_TODOS, ProductoForm, ProductoListQuery, ProductoListResponse, ProductoResponse,
    validate_producto_form,
};
use crate::models::shared::{Pagination, escape_like};
use crate::state::AppState;

/// Storage folder for product images.
const PRODUCTO_IMAGE_FOLDER: &str = "imagesProductos";

/// Case-insensitive OR filter over titulo and descripcion.
///
/// Returns `None` for an absent or blank search term. LIKE wildcards in the
/// term are escaped so user input never acts as a pattern.
fn search_filter(search: Option<&str>) -> Option<Condition> {
    let term = escape_like(search?.trim()).to_lowercase();
    if term.is_empty() {
        return None;
    }
    let pattern = format!("%{term}%");
    Some(
        Condition::any()
            .add(
                Expr::expr(Func::lower(Expr::col(producto::Column::Titulo)))
                    .like(LikeExpr::new(pattern.clone()).escape('\\')),
            )
            .add(
                Expr::expr(Func::lower(Expr::col(producto::Column::Descripcion)))
                    .like(LikeExpr::new(pattern).escape('\\')),
            ),
    )
}

async fn find_producto(state: &AppState, id: i32) -> Result<producto::Model, AppError> {
    producto::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Producto {id} no encontrado")))
}

/// Create a product from a multipart form with an optional `imagen` file.
#[utoipa::path(
    post,
    path = "/",
    tag = "Productos",
    security(("jwt" = [])),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created", body = ProductoResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user, multipart), fields(usuario = %auth_user.usuario))]
pub async fn create_producto(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ProductoResponse>), AppError> {
    let form = read_content_form(&mut multipart, state.config.storage.max_image_size).await?;
    let fields = ProductoForm {
        titulo: form.text("titulo"),
        categoria: form.text("categoria"),
        descripcion: form.text("descripcion"),
    };
    validate_producto_form(&fields)?;

    let imagen = match &form.imagen {
        Some(img) => Some(
            state
                .images
                .upload(&img.data, &img.extension, PRODUCTO_IMAGE_FOLDER)
                .await?,
        ),
        None => None,
    };

    let now = chrono::Utc::now();
    let result = producto::ActiveModel {
        trabajador_id: Set(auth_user.trabajador_id),
        titulo: Set(fields.titulo.trim().to_string()),
        categoria: Set(fields.categoria.trim().to_string()),
        descripcion: Set(fields.descripcion.trim().to_string()),
        imagen: Set(imagen.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await;

    match result {
        Ok(model) => Ok((StatusCode::CREATED, Json(model.into()))),
        Err(e) => {
            discard_image(
                &state.images,
                &auth_user.usuario,
                "producto.create",
                imagen.as_deref(),
            )
            .await;
            Err(e.into())
        }
    }
}

/// List products, newest first, with optional search and category filters.
#[utoipa::path(
    get,
    path = "/",
    tag = "Productos",
    params(ProductoListQuery),
    responses((status = 200, description = "Page of products", body = ProductoListResponse)),
)]
#[instrument(skip(state, query))]
pub async fn list_productos(
    State(state): State<AppState>,
    Query(query): Query<ProductoListQuery>,
) -> Result<Json<ProductoListResponse>, AppError> {
    // Ord::max, since ExprTrait::max is also in scope here.
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);

    let mut select = producto::Entity::find();

    if let Some(condition) = search_filter(query.search.as_deref()) {
        select = select.filter(condition);
    }

    if let Some(categoria) = query.categoria.as_deref()
        && categoria != CATEGORIA_TODOS
    {
        select = select.filter(producto::Column::Categoria.eq(categoria));
    }

    let paginator = select
        .order_by_desc(producto::Column::CreatedAt)
        .paginate(&state.db, per_page);

    let total = paginator.num_items().await?;
    let models = paginator.fetch_page(page - 1).await?;

    Ok(Json(ProductoListResponse {
        data: models.into_iter().map(ProductoResponse::from).collect(),
        pagination: Pagination::new(page, per_page, total),
    }))
}

/// Fetch a single product.
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Productos",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = ProductoResponse),
        (status = 404, description = "No such product", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_producto(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductoResponse>, AppError> {
    Ok(Json(find_producto(&state, id).await?.into()))
}

/// Update a product, optionally replacing its image.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Productos",
    security(("jwt" = [])),
    params(("id" = i32, Path, description = "Product ID")),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product updated", body = ProductoResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "No such product", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user, multipart), fields(usuario = %auth_user.usuario))]
pub async fn update_producto(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<ProductoResponse>, AppError> {
    let form = read_content_form(&mut multipart, state.config.storage.max_image_size).await?;
    let fields = ProductoForm {
        titulo: form.text("titulo"),
        categoria: form.text("categoria"),
        descripcion: form.text("descripcion"),
    };
    validate_producto_form(&fields)?;

    let existing = find_producto(&state, id).await?;
    let old_imagen = existing.imagen.clone();

    let new_imagen = match &form.imagen {
        Some(img) => Some(
            state
                .images
                .upload(&img.data, &img.extension, PRODUCTO_IMAGE_FOLDER)
                .await?,
        ),
        None => None,
    };

    let mut active: producto::ActiveModel = existing.into();
    active.titulo = Set(fields.titulo.trim().to_string());
    active.categoria = Set(fields.categoria.trim().to_string());
    active.descripcion = Set(fields.descripcion.trim().to_string());
    if let Some(path) = &new_imagen {
        active.imagen = Set(Some(path.clone()));
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = match active.update(&state.db).await {
        Ok(model) => model,
        Err(e) => {
            discard_image(
                &state.images,
                &auth_user.usuario,
                "producto.update",
                new_imagen.as_deref(),
            )
            .await;
            return Err(e.into());
        }
    };

    if new_imagen.is_some() {
        discard_image(
            &state.images,
            &auth_user.usuario,
            "producto.update",
            old_imagen.as_deref(),
        )
        .await;
    }

    Ok(Json(model.into()))
}

/// Delete a product along with its image.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Productos",
    security(("jwt" = [])),
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "No such product", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user), fields(usuario = %auth_user.usuario))]
pub async fn delete_producto(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let existing = find_producto(&state, id).await?;

    discard_image(
        &state.images,
        &auth_user.usuario,
        "producto.destroy",
        existing.imagen.as_deref(),
    )
    .await;

    producto::Entity::delete_by_id(id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, QueryTrait};

    use super::*;

    fn search_sql(search: Option<&str>) -> Option<String> {
        let condition = search_filter(search)?;
        Some(
            producto::Entity::find()
                .filter(condition)
                .build(DbBackend::Postgres)
                .to_string(),
        )
    }

    #[test]
    fn search_matches_titulo_or_descripcion_case_insensitively() {
        let sql = search_sql(Some("Paracetamol")).unwrap();
        assert!(sql.contains("LOWER"));
        assert!(sql.contains("LIKE"));
        assert!(sql.contains("ESCAPE"));
        assert!(sql.contains("OR"));
        // The pattern is lowercased before matching.
        assert!(sql.contains("paracetamol"));
        assert!(!sql.contains("Paracetamol"));
    }

    #[test]
    fn search_escapes_like_wildcards_in_the_term() {
        let sql = search_sql(Some("50%")).unwrap();
        // The literal percent sign is escaped; only the surrounding
        // wildcards match arbitrarily. Collapse doubled backslashes in case
        // the builder escapes them in the string literal.
        let normalized = sql.replace("\\\\", "\\");
        assert!(normalized.contains(r"50\%"));
    }

    #[test]
    fn blank_search_adds_no_filter() {
        assert!(search_sql(None).is_none());
        assert!(search_sql(Some("")).is_none());
        assert!(search_sql(Some("   ")).is_none());
    }
}
