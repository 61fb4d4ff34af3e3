use crate::{
    dto::IndentSubmission,
    entities::indent_item,
    errors::ServiceError,
    services::indents::{IndentConfirmation, IndentListResponse, IndentResponse, IndentStatus},
    ApiResponse, AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

const DEFAULT_PER_PAGE: u64 = 20;
const MAX_PER_PAGE: u64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ByNumberQuery {
    pub enterprise_id: Uuid,
}

/// Read view of a stored line item.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IndentItemResponse {
    pub id: Uuid,
    pub material_code: String,
    pub quality_code: String,
    pub top_design: Option<String>,
    pub quantity: Decimal,
    pub unit: String,
    pub pcs: i32,
    pub rate: Decimal,
    pub amount: Decimal,
    pub weight_tons: Decimal,
    pub discount_amount: Decimal,
    pub handling_charges: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<indent_item::Model> for IndentItemResponse {
    fn from(model: indent_item::Model) -> Self {
        Self {
            id: model.id,
            material_code: model.material_code,
            quality_code: model.quality_code,
            top_design: model.top_design,
            quantity: model.quantity,
            unit: model.unit,
            pcs: model.pcs,
            rate: model.rate,
            amount: model.amount,
            weight_tons: model.weight_tons,
            discount_amount: model.discount_amount,
            handling_charges: model.handling_charges,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn actor_from_headers(headers: &HeaderMap) -> String {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .unwrap_or("system")
        .to_string()
}

/// Submits an order, creating it or reconciling it against the stored order
/// with the same (enterprise, indent number) key.
#[utoipa::path(
    post,
    path = "/api/v1/indents",
    request_body = IndentSubmission,
    responses(
        (status = 201, description = "Indent created", body = IndentConfirmation),
        (status = 200, description = "Existing indent reconciled", body = IndentConfirmation),
        (status = 400, description = "Unresolvable reference"),
        (status = 422, description = "Invalid payload"),
    ),
    tag = "indents"
)]
pub async fn submit_indent(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<IndentSubmission>,
) -> Result<(StatusCode, Json<ApiResponse<IndentConfirmation>>), ServiceError> {
    let actor = actor_from_headers(&headers);
    let confirmation = state
        .services
        .indents
        .submit_indent(payload, &actor)
        .await?;
    // A resubmission reconciles the stored order in place rather than
    // creating a new resource.
    let status_code = if confirmation.status == IndentStatus::Modified.to_string() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status_code, Json(ApiResponse::success(confirmation))))
}

/// Full edit of an existing indent, honoring the explicit removed-items list.
#[utoipa::path(
    put,
    path = "/api/v1/indents/{id}",
    request_body = IndentSubmission,
    responses(
        (status = 200, description = "Indent reconciled", body = IndentConfirmation),
        (status = 409, description = "Indent missing or key mismatch"),
    ),
    tag = "indents"
)]
pub async fn update_indent(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<IndentSubmission>,
) -> Result<Json<ApiResponse<IndentConfirmation>>, ServiceError> {
    let actor = actor_from_headers(&headers);
    let confirmation = state
        .services
        .indents
        .upsert_indent_full(id, payload, &actor)
        .await?;
    Ok(Json(ApiResponse::success(confirmation)))
}

#[utoipa::path(
    get,
    path = "/api/v1/indents/{id}",
    responses(
        (status = 200, description = "Indent found", body = IndentResponse),
        (status = 404, description = "No such indent"),
    ),
    tag = "indents"
)]
pub async fn get_indent(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<IndentResponse>>, ServiceError> {
    let indent = state
        .services
        .indents
        .get_indent(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("indent {id} not found")))?;
    Ok(Json(ApiResponse::success(indent)))
}

#[utoipa::path(
    get,
    path = "/api/v1/indents/by-number/{indent_number}",
    params(("enterprise_id" = Uuid, Query, description = "Owning enterprise")),
    responses(
        (status = 200, description = "Indent found", body = IndentResponse),
        (status = 404, description = "No such indent"),
    ),
    tag = "indents"
)]
pub async fn get_indent_by_number(
    State(state): State<AppState>,
    Path(indent_number): Path<String>,
    Query(query): Query<ByNumberQuery>,
) -> Result<Json<ApiResponse<IndentResponse>>, ServiceError> {
    let indent = state
        .services
        .indents
        .get_indent_by_number(query.enterprise_id, &indent_number)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("indent {indent_number} not found"))
        })?;
    Ok(Json(ApiResponse::success(indent)))
}

#[utoipa::path(
    get,
    path = "/api/v1/indents/{id}/items",
    responses(
        (status = 200, description = "Items for the indent", body = [IndentItemResponse]),
        (status = 404, description = "No such indent"),
    ),
    tag = "indents"
)]
pub async fn list_indent_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<IndentItemResponse>>>, ServiceError> {
    state
        .services
        .indents
        .get_indent(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("indent {id} not found")))?;

    let items = state
        .services
        .indents
        .get_indent_items(id)
        .await?
        .into_iter()
        .map(IndentItemResponse::from)
        .collect();
    Ok(Json(ApiResponse::success(items)))
}

#[utoipa::path(
    get,
    path = "/api/v1/indents",
    responses(
        (status = 200, description = "Paged indent listing", body = IndentListResponse),
    ),
    tag = "indents"
)]
pub async fn list_indents(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<IndentListResponse>>, ServiceError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);
    let listing = state.services.indents.list_indents(page, per_page).await?;
    Ok(Json(ApiResponse::success(listing)))
}
