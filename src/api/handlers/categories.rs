use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use crate::utils::validation::slugify;
use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize)]
pub struct CategoryQuery {
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteCategoryQuery {
    pub id: Option<String>,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 255, message = "Category name must be between 1 and 255 characters"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct UpdateCategoryRequest {
    pub id: String,
    #[validate(length(min = 1, max = 255, message = "Category name must be between 1 and 255 characters"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Serialize)]
pub struct CategoryWithSubcategories {
    #[serde(flatten)]
    pub category: categories::Model,
    pub sub_categories: Vec<sub_categories::Model>,
}

#[derive(Serialize)]
pub struct UpdateCategoryResponse {
    pub success: bool,
    pub category: categories::Model,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/api/categories",
    params(
        ("name" = Option<String>, Query, description = "Look up a single category by name")
    ),
    responses(
        (status = 200, description = "All categories with their subcategories, or one by name")
    ),
    tag = "catalog"
)]
pub async fn list_categories(
    State(state): State<crate::AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Response, AppError> {
    if let Some(name) = query.name {
        let category = Categories::find()
            .filter(categories::Column::Name.eq(name))
            .one(&state.db)
            .await?;
        return Ok(Json(category).into_response());
    }

    let items = Categories::find()
        .find_with_related(SubCategories)
        .all(&state.db)
        .await?;

    let result: Vec<CategoryWithSubcategories> = items
        .into_iter()
        .map(|(category, sub_categories)| CategoryWithSubcategories {
            category,
            sub_categories,
        })
        .collect();

    Ok(Json(result).into_response())
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Category created"),
        (status = 400, description = "Invalid input")
    ),
    tag = "catalog"
)]
pub async fn create_category(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<Json<categories::Model>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let category = categories::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        slug: Set(slugify(&payload.name)),
        name: Set(payload.name),
        description: Set(payload.description),
    };

    Ok(Json(category.insert(&state.db).await?))
}

#[utoipa::path(
    put,
    path = "/api/categories",
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated"),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Category not found")
    ),
    tag = "catalog"
)]
pub async fn update_category(
    State(state): State<crate::AppState>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<UpdateCategoryResponse>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let category = Categories::find_by_id(&payload.id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound("Category not found".to_string()))?;

    let mut active: categories::ActiveModel = category.into();
    active.slug = Set(slugify(&payload.name));
    active.name = Set(payload.name);
    active.description = Set(payload.description);

    let updated = active.update(&state.db).await?;

    Ok(Json(UpdateCategoryResponse {
        success: true,
        category: updated,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/categories",
    params(
        ("id" = String, Query, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted", body = DeleteResponse),
        (status = 400, description = "Missing category ID"),
        (status = 404, description = "Category not found")
    ),
    tag = "catalog"
)]
pub async fn delete_category(
    State(state): State<crate::AppState>,
    Query(query): Query<DeleteCategoryQuery>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or(AppError::BadRequest("Category ID is required".to_string()))?;

    let category = Categories::find_by_id(&id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound("Category not found".to_string()))?;

    category.delete(&state.db).await?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "Category deleted successfully".to_string(),
    }))
}
