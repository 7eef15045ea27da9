pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::uploads::UploadStorage;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::uploads::upload_image,
        api::handlers::uploads::cleanup_uploads,
        api::handlers::categories::list_categories,
        api::handlers::categories::create_category,
        api::handlers::categories::update_category,
        api::handlers::categories::delete_category,
        api::handlers::subcategories::list_subcategories,
        api::handlers::subcategories::create_subcategory,
        api::handlers::subcategories::update_subcategory,
        api::handlers::subcategories::delete_subcategory,
        api::handlers::products::list_products,
        api::handlers::products::create_product,
        api::handlers::products::update_product,
        api::handlers::products::delete_product,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::auth::RegisterRequest,
            api::handlers::auth::LoginRequest,
            api::handlers::auth::RegisterResponse,
            api::handlers::auth::LoginResponse,
            api::handlers::auth::UserSummary,
            api::handlers::uploads::UploadResponse,
            api::handlers::uploads::CleanupRequest,
            api::handlers::uploads::CleanupResponse,
            api::handlers::categories::CreateCategoryRequest,
            api::handlers::categories::UpdateCategoryRequest,
            api::handlers::categories::DeleteResponse,
            api::handlers::subcategories::CreateSubCategoryRequest,
            api::handlers::subcategories::UpdateSubCategoryRequest,
            api::handlers::products::CreateProductRequest,
            api::handlers::products::UpdateProductRequest,
            api::handlers::products::DeleteProductResponse,
            api::handlers::health::HealthResponse,
            services::uploads::CleanupOutcome,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "catalog", description = "Category, subcategory and product endpoints"),
        (name = "uploads", description = "Image staging and cleanup endpoints"),
        (name = "system", description = "Health and diagnostics")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<UploadStorage>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/api/auth/register", post(api::handlers::auth::register))
        .route("/api/auth/login", post(api::handlers::auth::login))
        .route(
            "/api/categories",
            get(api::handlers::categories::list_categories)
                .post(api::handlers::categories::create_category)
                .put(api::handlers::categories::update_category)
                .delete(api::handlers::categories::delete_category),
        )
        .route(
            "/api/subcategories",
            get(api::handlers::subcategories::list_subcategories)
                .post(api::handlers::subcategories::create_subcategory)
                .put(api::handlers::subcategories::update_subcategory)
                .delete(api::handlers::subcategories::delete_subcategory),
        )
        .route(
            "/api/products",
            get(api::handlers::products::list_products)
                .post(api::handlers::products::create_product)
                .put(api::handlers::products::update_product)
                .delete(api::handlers::products::delete_product),
        )
        .route(
            "/api/upload",
            post(api::handlers::uploads::upload_image).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/api/upload/cleanup",
            post(api::handlers::uploads::cleanup_uploads).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .nest_service(
            "/temp-uploads",
            ServeDir::new(state.storage.temp_dir()),
        )
        .nest_service("/uploads", ServeDir::new(state.storage.permanent_dir()))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.max_upload_size + 1024 * 1024, // 1MB buffer for multipart overhead
        ))
        .with_state(state)
}
