use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{auth, blog, forms, producto};
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/blogs", blog_routes())
        .nest("/productos", producto_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::login))
        .routes(routes!(auth::logout))
        .routes(routes!(auth::me))
}

fn blog_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(blog::list_blogs, blog::create_blog))
        .routes(routes!(blog::get_blog, blog::update_blog, blog::delete_blog))
        .layer(forms::content_form_body_limit())
}

fn producto_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(producto::list_productos, producto::create_producto))
        .routes(routes!(
            producto::get_producto,
            producto::update_producto,
            producto::delete_producto
        ))
        .layer(forms::content_form_body_limit())
}
