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
pub struct SubCategoryQuery {
    pub name: Option<String>,
    pub category_id: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteSubCategoryQuery {
    pub id: Option<String>,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct CreateSubCategoryRequest {
    #[validate(length(min = 1, max = 255, message = "Subcategory name must be between 1 and 255 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub category_id: String,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct UpdateSubCategoryRequest {
    pub id: String,
    #[validate(length(min = 1, max = 255, message = "Subcategory name must be between 1 and 255 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<String>,
}

#[derive(Serialize)]
pub struct UpdateSubCategoryResponse {
    pub success: bool,
    pub subcategory: sub_categories::Model,
}

#[utoipa::path(
    get,
    path = "/api/subcategories",
    params(
        ("name" = Option<String>, Query, description = "Subcategory name"),
        ("category_id" = Option<String>, Query, description = "Owning category ID")
    ),
    responses(
        (status = 200, description = "All subcategories, or one by name within a category")
    ),
    tag = "catalog"
)]
pub async fn list_subcategories(
    State(state): State<crate::AppState>,
    Query(query): Query<SubCategoryQuery>,
) -> Result<Response, AppError> {
    if let (Some(name), Some(category_id)) = (query.name, query.category_id) {
        let sub_category = SubCategories::find()
            .filter(sub_categories::Column::Name.eq(name))
            .filter(sub_categories::Column::CategoryId.eq(category_id))
            .one(&state.db)
            .await?;
        return Ok(Json(sub_category).into_response());
    }

    let sub_categories = SubCategories::find().all(&state.db).await?;
    Ok(Json(sub_categories).into_response())
}

#[utoipa::path(
    post,
    path = "/api/subcategories",
    request_body = CreateSubCategoryRequest,
    responses(
        (status = 200, description = "Subcategory created"),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Owning category not found")
    ),
    tag = "catalog"
)]
pub async fn create_subcategory(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreateSubCategoryRequest>,
) -> Result<Json<sub_categories::Model>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    Categories::find_by_id(&payload.category_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Category with ID {} not found",
                payload.category_id
            ))
        })?;

    let sub_category = sub_categories::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        slug: Set(slugify(&payload.name)),
        name: Set(payload.name),
        description: Set(payload.description),
        category_id: Set(payload.category_id),
    };

    Ok(Json(sub_category.insert(&state.db).await?))
}

#[utoipa::path(
    put,
    path = "/api/subcategories",
    request_body = UpdateSubCategoryRequest,
    responses(
        (status = 200, description = "Subcategory updated"),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Subcategory not found")
    ),
    tag = "catalog"
)]
pub async fn update_subcategory(
    State(state): State<crate::AppState>,
    Json(payload): Json<UpdateSubCategoryRequest>,
) -> Result<Json<UpdateSubCategoryResponse>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let sub_category = SubCategories::find_by_id(&payload.id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound("Subcategory not found".to_string()))?;

    if let Some(category_id) = &payload.category_id {
        Categories::find_by_id(category_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Category with ID {} not found", category_id))
            })?;
    }

    let mut active: sub_categories::ActiveModel = sub_category.into();
    active.slug = Set(slugify(&payload.name));
    active.name = Set(payload.name);
    active.description = Set(payload.description);
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }

    let updated = active.update(&state.db).await?;

    Ok(Json(UpdateSubCategoryResponse {
        success: true,
        subcategory: updated,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/subcategories",
    params(
        ("id" = String, Query, description = "Subcategory ID")
    ),
    responses(
        (status = 200, description = "Subcategory deleted"),
        (status = 400, description = "Missing subcategory ID"),
        (status = 404, description = "Subcategory not found")
    ),
    tag = "catalog"
)]
pub async fn delete_subcategory(
    State(state): State<crate::AppState>,
    Query(query): Query<DeleteSubCategoryQuery>,
) -> Result<Json<super::categories::DeleteResponse>, AppError> {
    let id = query.id.filter(|id| !id.is_empty()).ok_or(AppError::BadRequest(
        "Subcategory ID is required".to_string(),
    ))?;

    let sub_category = SubCategories::find_by_id(&id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound("Subcategory not found".to_string()))?;

    sub_category.delete(&state.db).await?;

    Ok(Json(super::categories::DeleteResponse {
        success: true,
        message: "Subcategory deleted successfully".to_string(),
    }))
}
