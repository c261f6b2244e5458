use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set, SqlErr};
use tracing::instrument;

use crate::entity::blog;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::forms::{discard_image, read_content_form};
use crate::models::blog::{
    BlogForm, BlogListQuery, BlogListResponse, BlogResponse, validate_blog_form,
};
use crate::models::shared::Pagination;
use crate::state::AppState;

/// Storage folder for blog images.
const BLOG_IMAGE_FOLDER: &str = "imagesBlog";

fn conflict_on_unique(e: sea_orm::DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Ya existe un blog con ese titulo".into())
        }
        _ => AppError::from(e),
    }
}

async fn find_blog(state: &AppState, id: i32) -> Result<blog::Model, AppError> {
    blog::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Blog {id} no encontrado")))
}

/// Create a blog post from a multipart form with an optional `imagen` file.
#[utoipa::path(
    post,
    path = "/",
    tag = "Blogs",
    security(("jwt" = [])),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Blog created", body = BlogResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 409, description = "Duplicate titulo", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user, multipart), fields(usuario = %auth_user.usuario))]
pub async fn create_blog(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<BlogResponse>), AppError> {
    let form = read_content_form(&mut multipart, state.config.storage.max_image_size).await?;
    let fields = BlogForm {
        titulo: form.text("titulo"),
        subtitulo: form.text("subtitulo"),
        contenido: form.text("contenido"),
    };
    validate_blog_form(&fields)?;

    // Store the image first: a failed blob write must abort before any
    // database mutation.
    let imagen = match &form.imagen {
        Some(img) => Some(
            state
                .images
                .upload(&img.data, &img.extension, BLOG_IMAGE_FOLDER)
                .await?,
        ),
        None => None,
    };

    let now = chrono::Utc::now();
    let result = blog::ActiveModel {
        trabajador_id: Set(auth_user.trabajador_id),
        titulo: Set(fields.titulo.trim().to_string()),
        subtitulo: Set(fields.subtitulo.trim().to_string()),
        contenido: Set(fields.contenido),
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
            // The freshly written blob would be orphaned otherwise.
            discard_image(
                &state.images,
                &auth_user.usuario,
                "blog.create",
                imagen.as_deref(),
            )
            .await;
            Err(conflict_on_unique(e))
        }
    }
}

/// List blog posts, newest first.
#[utoipa::path(
    get,
    path = "/",
    tag = "Blogs",
    params(BlogListQuery),
    responses((status = 200, description = "Page of blogs", body = BlogListResponse)),
)]
#[instrument(skip(state, query))]
pub async fn list_blogs(
    State(state): State<AppState>,
    Query(query): Query<BlogListQuery>,
) -> Result<Json<BlogListResponse>, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);

    let paginator = blog::Entity::find()
        .order_by_desc(blog::Column::CreatedAt)
        .paginate(&state.db, per_page);

    let total = paginator.num_items().await?;
    let models = paginator.fetch_page(page - 1).await?;

    Ok(Json(BlogListResponse {
        data: models.into_iter().map(BlogResponse::from).collect(),
        pagination: Pagination::new(page, per_page, total),
    }))
}

/// Fetch a single blog post.
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Blogs",
    params(("id" = i32, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Blog", body = BlogResponse),
        (status = 404, description = "No such blog", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<BlogResponse>, AppError> {
    Ok(Json(find_blog(&state, id).await?.into()))
}

/// Update a blog post, optionally replacing its image.
///
/// When a new image is supplied, the record points at the new blob before
/// the old blob is deleted; a crash in between leaves an orphan blob, never
/// a dangling reference.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Blogs",
    security(("jwt" = [])),
    params(("id" = i32, Path, description = "Blog ID")),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Blog updated", body = BlogResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "No such blog", body = ErrorBody),
        (status = 409, description = "Duplicate titulo", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user, multipart), fields(usuario = %auth_user.usuario))]
pub async fn update_blog(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<BlogResponse>, AppError> {
    let form = read_content_form(&mut multipart, state.config.storage.max_image_size).await?;
    let fields = BlogForm {
        titulo: form.text("titulo"),
        subtitulo: form.text("subtitulo"),
        contenido: form.text("contenido"),
    };
    validate_blog_form(&fields)?;

    let existing = find_blog(&state, id).await?;
    let old_imagen = existing.imagen.clone();

    let new_imagen = match &form.imagen {
        Some(img) => Some(
            state
                .images
                .upload(&img.data, &img.extension, BLOG_IMAGE_FOLDER)
                .await?,
        ),
        None => None,
    };

    let mut active: blog::ActiveModel = existing.into();
    active.titulo = Set(fields.titulo.trim().to_string());
    active.subtitulo = Set(fields.subtitulo.trim().to_string());
    active.contenido = Set(fields.contenido);
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
                "blog.update",
                new_imagen.as_deref(),
            )
            .await;
            return Err(conflict_on_unique(e));
        }
    };

    if new_imagen.is_some() {
        discard_image(
            &state.images,
            &auth_user.usuario,
            "blog.update",
            old_imagen.as_deref(),
        )
        .await;
    }

    Ok(Json(model.into()))
}

/// Delete a blog post along with its image.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Blogs",
    security(("jwt" = [])),
    params(("id" = i32, Path, description = "Blog ID")),
    responses(
        (status = 204, description = "Blog deleted"),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "No such blog", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user), fields(usuario = %auth_user.usuario))]
pub async fn delete_blog(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let existing = find_blog(&state, id).await?;

    discard_image(
        &state.images,
        &auth_user.usuario,
        "blog.destroy",
        existing.imagen.as_deref(),
    )
    .await;

    blog::Entity::delete_by_id(id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}
