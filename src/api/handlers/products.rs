use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use crate::services::uploads::{PERMANENT_AREA, UploadStorage};
use crate::utils::validation::slugify;
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize)]
pub struct DeleteProductQuery {
    pub id: Option<String>,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Product name must be between 1 and 255 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,
    pub dimensions: Option<String>,
    pub material: Option<String>,
    pub category_id: String,
    pub sub_category_id: String,
    /// Temp-area references staged by the upload endpoint; promoted into
    /// permanent storage before the product row is inserted.
    #[serde(default)]
    pub temp_image_paths: Vec<String>,
    pub slug: Option<String>,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct UpdateProductRequest {
    pub id: String,
    #[validate(length(min = 1, max = 255, message = "Product name must be between 1 and 255 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,
    pub dimensions: Option<String>,
    pub material: Option<String>,
    pub category_id: Option<String>,
    pub sub_category_id: Option<String>,
    /// Permanent-area references the product keeps
    #[serde(default)]
    pub images: Vec<String>,
    /// Newly staged temp-area references, promoted on update
    #[serde(default)]
    pub temp_image_paths: Vec<String>,
}

#[derive(Serialize)]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl From<categories::Model> for CategorySummary {
    fn from(category: categories::Model) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
        }
    }
}

impl From<sub_categories::Model> for CategorySummary {
    fn from(sub_category: sub_categories::Model) -> Self {
        Self {
            id: sub_category.id,
            name: sub_category.name,
            slug: sub_category.slug,
        }
    }
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: f64,
    pub dimensions: String,
    pub material: String,
    pub images: Vec<String>,
    pub category: Option<CategorySummary>,
    pub sub_category: Option<CategorySummary>,
    pub created_at: Option<chrono::DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct CreateProductResponse {
    pub success: bool,
    pub product: ProductResponse,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteProductResponse {
    pub success: bool,
}

fn product_response(
    product: products::Model,
    category: Option<categories::Model>,
    sub_category: Option<sub_categories::Model>,
) -> ProductResponse {
    let images: Vec<String> = serde_json::from_value(product.images).unwrap_or_default();

    ProductResponse {
        id: product.id,
        name: product.name,
        slug: product.slug,
        description: product.description,
        price: product.price,
        dimensions: product.dimensions,
        material: product.material,
        images,
        category: category.map(CategorySummary::from),
        sub_category: sub_category.map(CategorySummary::from),
        created_at: product.created_at,
    }
}

/// Promotes each staged reference in order. On the first failure the
/// already-promoted files are removed again so no half-claimed set remains.
async fn promote_all(
    storage: &UploadStorage,
    temp_paths: &[String],
) -> Result<Vec<String>, AppError> {
    let mut promoted = Vec::with_capacity(temp_paths.len());

    for path in temp_paths {
        match storage.promote(path).await {
            Ok(permanent) => promoted.push(permanent),
            Err(e) => {
                remove_promoted(storage, &promoted).await;
                return Err(e);
            }
        }
    }

    Ok(promoted)
}

async fn remove_promoted(storage: &UploadStorage, paths: &[String]) {
    for path in paths {
        if let Err(e) = storage.remove_permanent(path).await {
            tracing::warn!("Failed to remove promoted file {}: {}", path, e);
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products with category summaries")
    ),
    tag = "catalog"
)]
pub async fn list_products(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let items = Products::find()
        .find_also_related(Categories)
        .all(&state.db)
        .await?;

    let mut result = Vec::with_capacity(items.len());
    for (product, category) in items {
        let sub_category = SubCategories::find_by_id(product.sub_category_id.clone())
            .one(&state.db)
            .await?;
        result.push(product_response(product, category, sub_category));
    }

    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Product created with promoted image references"),
        (status = 400, description = "Missing required fields"),
        (status = 404, description = "Category or subcategory not found")
    ),
    tag = "catalog"
)]
pub async fn create_product(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<Json<CreateProductResponse>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let category = Categories::find_by_id(&payload.category_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Category with ID {} not found",
                payload.category_id
            ))
        })?;

    let sub_category = SubCategories::find()
        .filter(sub_categories::Column::Id.eq(&payload.sub_category_id))
        .filter(sub_categories::Column::CategoryId.eq(&payload.category_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Subcategory with ID {} not found for category {}",
                payload.sub_category_id, payload.category_id
            ))
        })?;

    // Promote before the insert so the committed row only ever references
    // files that exist in the permanent area.
    let images = promote_all(&state.storage, &payload.temp_image_paths).await?;

    let product = products::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        slug: Set(payload.slug.unwrap_or_else(|| slugify(&payload.name))),
        name: Set(payload.name),
        description: Set(payload.description.unwrap_or_default()),
        price: Set(payload.price),
        dimensions: Set(payload.dimensions.unwrap_or_default()),
        material: Set(payload.material.unwrap_or_default()),
        images: Set(serde_json::json!(images)),
        category_id: Set(payload.category_id),
        sub_category_id: Set(payload.sub_category_id),
        created_at: Set(Some(Utc::now())),
    };

    let product = match product.insert(&state.db).await {
        Ok(product) => product,
        Err(e) => {
            // The row never landed; drop the files it would have owned.
            remove_promoted(&state.storage, &images).await;
            return Err(e.into());
        }
    };

    Ok(Json(CreateProductResponse {
        success: true,
        product: product_response(product, Some(category), Some(sub_category)),
    }))
}

#[utoipa::path(
    put,
    path = "/api/products",
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated"),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Product not found")
    ),
    tag = "catalog"
)]
pub async fn update_product(
    State(state): State<crate::AppState>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<products::Model>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let product = Products::find_by_id(&payload.id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound("Product not found".to_string()))?;

    // Keep only references that actually live in the permanent area
    let permanent_prefix = format!("/{}/", PERMANENT_AREA);
    let mut images = payload.images;
    images.retain(|path| path.starts_with(&permanent_prefix));
    images.extend(promote_all(&state.storage, &payload.temp_image_paths).await?);

    let mut active: products::ActiveModel = product.into();
    active.slug = Set(slugify(&payload.name));
    active.name = Set(payload.name);
    active.description = Set(payload.description.unwrap_or_default());
    active.price = Set(payload.price);
    active.dimensions = Set(payload.dimensions.unwrap_or_default());
    active.material = Set(payload.material.unwrap_or_default());
    active.images = Set(serde_json::json!(images));
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(sub_category_id) = payload.sub_category_id {
        active.sub_category_id = Set(sub_category_id);
    }

    Ok(Json(active.update(&state.db).await?))
}

#[utoipa::path(
    delete,
    path = "/api/products",
    params(
        ("id" = String, Query, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = DeleteProductResponse),
        (status = 400, description = "Missing product ID"),
        (status = 404, description = "Product not found")
    ),
    tag = "catalog"
)]
pub async fn delete_product(
    State(state): State<crate::AppState>,
    Query(query): Query<DeleteProductQuery>,
) -> Result<Json<DeleteProductResponse>, AppError> {
    let id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or(AppError::BadRequest("Product ID is required".to_string()))?;

    let product = Products::find_by_id(&id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound("Product not found".to_string()))?;

    product.delete(&state.db).await?;

    Ok(Json(DeleteProductResponse { success: true }))
}
