use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::handler::item_handler::{
    add_item_handler, all_items_handler, delete_item_handler, get_item_handler, get_item_price_body_handler,
    get_item_price_query_handler, get_item_with_price_handler, list_items_handler, patch_item_handler,
    total_items_handler, update_item_handler, ItemState,
};

pub fn item_router(service: ItemState) -> Router {
    // legacy paths
    let legacy = Router::new()
        .route("/id/{id}", get(get_item_handler))
        .route("/addItem", post(add_item_handler))
        .route("/updateItem", put(update_item_handler))
        .route("/patchItem/{field}", patch(patch_item_handler))
        .route("/deleteItem", delete(delete_item_handler))
        .route("/deleteItem/id", delete(delete_item_handler));

    let api = Router::new()
        .route("/api/items", get(list_items_handler))
        .route("/api/allitem", get(all_items_handler).head(all_items_handler))
        .route("/api/totalitem", get(total_items_handler).head(total_items_handler))
        .route("/api/item", post(add_item_handler))
        .route("/api/item/{id}", get(get_item_handler))
        .route("/api/item/id", put(update_item_handler))
        .route("/api/item/id/{field}", patch(patch_item_handler))
        .route("/api/item/price/{id}/{price}", get(get_item_with_price_handler))
        .route("/api/item/0/price", get(get_item_price_query_handler))
        .route("/api/item/1/price", get(get_item_price_body_handler))
        .route("/api/delete/id", delete(delete_item_handler));

    legacy.merge(api).with_state(service)
}
