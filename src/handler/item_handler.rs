use axum::{
    extract::{rejection::QueryRejection, OriginalUri, Path, Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::dto::item_dto::{ItemKeyRequest, ItemListResponse, ItemTotalResponse, PatchItemRequest, PriceLookupRequest};
use crate::model::item::{Item, ItemId, PatchField};
use crate::repository::record::UpsertOutcome;
use crate::service::item_service::ItemService;
use crate::util::error::HandlerError;
use crate::util::validated_json::ValidatedJson;

pub type ItemState = Arc<dyn ItemService>;

const ENDPOINT_HEADER: HeaderName = HeaderName::from_static("x-fakeapi-endpoint");
const METHOD_HEADER: HeaderName = HeaderName::from_static("x-fakeapi-method");
const ITEMS_HEADER: HeaderName = HeaderName::from_static("x-fakeapi-items");

// GET/HEAD /id/{id}, /api/item/{id}
pub async fn get_item_handler(
    State(service): State<ItemState>,
    Path(id): Path<String>,
) -> Result<Json<Item>, HandlerError> {
    info!("[get_item_handler] Handler called for id {}", id);
    let item = service.get_item(&ItemId::from(id.as_str())).await?;
    Ok(Json(item))
}

// GET /api/item/price/{id}/{price}
pub async fn get_item_with_price_handler(
    State(service): State<ItemState>,
    Path((id, price)): Path<(String, String)>,
) -> Result<Json<Item>, HandlerError> {
    info!("[get_item_with_price_handler] Handler called for id {} and price {}", id, price);
    let price: f64 = price.parse().map_err(|_| {
        warn!("[get_item_with_price_handler] Invalid price {}", price);
        HandlerError::validation(format!("'{}' is not a valid price", price))
    })?;
    let item = service.get_item_with_price(&ItemId::from(id.as_str()), price).await?;
    Ok(Json(item))
}

// GET /api/item/0/price?item_id=..&price=..
pub async fn get_item_price_query_handler(
    State(service): State<ItemState>,
    query: Result<Query<PriceLookupRequest>, QueryRejection>,
) -> Result<Json<Item>, HandlerError> {
    info!("[get_item_price_query_handler] Handler called");
    let Query(request) = query.map_err(|e| {
        warn!("[get_item_price_query_handler] Bad query string: {}", e);
        HandlerError::validation("Query must carry item_id and price").with_details(e.body_text())
    })?;
    request
        .validate()
        .map_err(|e| HandlerError::validation("Query failed validation").with_details(e.to_string()))?;
    let item = service.get_item_with_price(&request.item_id, request.price).await?;
    Ok(Json(item))
}

// GET /api/item/1/price with {"item_id": .., "price": ..}
pub async fn get_item_price_body_handler(
    State(service): State<ItemState>,
    ValidatedJson(request): ValidatedJson<PriceLookupRequest>,
) -> Result<Json<Item>, HandlerError> {
    info!("[get_item_price_body_handler] Handler called for id {}", request.item_id);
    let item = service.get_item_with_price(&request.item_id, request.price).await?;
    Ok(Json(item))
}

// GET /api/items
pub async fn list_items_handler(State(service): State<ItemState>) -> Result<Json<ItemListResponse>, HandlerError> {
    info!("[list_items_handler] Handler called");
    let items = service.list_items().await?;
    Ok(Json(ItemListResponse { count: items.len(), items }))
}

fn endpoint_headers(uri: &OriginalUri, method: &Method) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(uri.0.path()) {
        headers.insert(ENDPOINT_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_str(method.as_str()) {
        headers.insert(METHOD_HEADER, value);
    }
    headers
}

// GET/HEAD /api/totalitem
pub async fn total_items_handler(
    State(service): State<ItemState>,
    method: Method,
    uri: OriginalUri,
) -> Result<Response, HandlerError> {
    info!("[total_items_handler] Handler called ({})", method);
    let headers = endpoint_headers(&uri, &method);
    if method == Method::HEAD {
        return Ok((StatusCode::NO_CONTENT, headers).into_response());
    }
    let items = service.count_items().await?;
    Ok((StatusCode::OK, headers, Json(ItemTotalResponse { items })).into_response())
}

// GET/HEAD /api/allitem
pub async fn all_items_handler(
    State(service): State<ItemState>,
    method: Method,
    uri: OriginalUri,
) -> Result<Response, HandlerError> {
    info!("[all_items_handler] Handler called ({})", method);
    let mut headers = endpoint_headers(&uri, &method);
    let count = service.count_items().await?;
    headers.insert(ITEMS_HEADER, HeaderValue::from(count));
    if method == Method::HEAD {
        return Ok((StatusCode::NO_CONTENT, headers).into_response());
    }
    let items = service.list_items().await?;
    Ok((StatusCode::OK, headers, Json(items)).into_response())
}

// POST /addItem, /api/item
pub async fn add_item_handler(
    State(service): State<ItemState>,
    ValidatedJson(item): ValidatedJson<Item>,
) -> Result<impl IntoResponse, HandlerError> {
    info!("[add_item_handler] Handler called for id {}", item.id);
    let item = service.add_item(item).await.map_err(|e| {
        warn!("[add_item_handler] Item not added: {}", e);
        e
    })?;
    Ok((StatusCode::CREATED, Json(item)))
}

// PUT /updateItem, /api/item/id
pub async fn update_item_handler(
    State(service): State<ItemState>,
    ValidatedJson(item): ValidatedJson<Item>,
) -> Result<impl IntoResponse, HandlerError> {
    info!("[update_item_handler] Handler called for id {}", item.id);
    let (item, outcome) = service.update_item(item).await.map_err(|e| {
        warn!("[update_item_handler] Item not stored: {}", e);
        e
    })?;
    let status = match outcome {
        UpsertOutcome::Created => StatusCode::CREATED,
        UpsertOutcome::Replaced => StatusCode::OK,
    };
    Ok((status, Json(item)))
}

// PATCH /patchItem/{field}, /api/item/id/{field}
pub async fn patch_item_handler(
    State(service): State<ItemState>,
    Path(field): Path<String>,
    ValidatedJson(request): ValidatedJson<PatchItemRequest>,
) -> Result<Json<Item>, HandlerError> {
    info!("[patch_item_handler] Handler called for field {}", field);
    let field: PatchField = field.parse().map_err(|e: String| {
        warn!("[patch_item_handler] {}", e);
        HandlerError::validation(e)
    })?;
    let (id, patch) = request.into_patch(field).map_err(HandlerError::validation)?;
    let item = service.patch_item(&id, patch).await?;
    Ok(Json(item))
}

// DELETE /deleteItem, /deleteItem/id, /api/delete/id
pub async fn delete_item_handler(
    State(service): State<ItemState>,
    ValidatedJson(request): ValidatedJson<ItemKeyRequest>,
) -> Result<Json<Item>, HandlerError> {
    info!("[delete_item_handler] Handler called for id {}", request.id);
    let item = service.delete_item(&request.id).await.map_err(|e| {
        warn!("[delete_item_handler] Item not deleted: {}", e);
        e
    })?;
    Ok(Json(item))
}
