use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::item::{validate_item_id, Item, ItemId, ItemPatch, PatchField};

/// Body of the DELETE routes
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ItemKeyRequest {
    #[serde(alias = "item_id")]
    #[validate(custom(function = "validate_item_id"))]
    pub id: ItemId,
}

/// Body of the PATCH routes. Only the field named in the path is read.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PatchItemRequest {
    #[serde(alias = "item_id")]
    #[validate(custom(function = "validate_item_id"))]
    pub id: ItemId,
    #[serde(default, alias = "newprice")]
    #[validate(range(min = 0.0, message = "price cannot be negative"))]
    pub price: Option<f64>,
    #[serde(default, alias = "newquantity")]
    pub quantity: Option<u64>,
    #[serde(default, alias = "newdescription")]
    pub description: Option<String>,
}

impl PatchItemRequest {
    pub fn into_patch(self, field: PatchField) -> Result<(ItemId, ItemPatch), String> {
        let patch = match field {
            PatchField::Price => self.price.map(ItemPatch::Price),
            PatchField::Quantity => self.quantity.map(ItemPatch::Quantity),
            PatchField::Description => self.description.map(ItemPatch::Description),
        };
        match patch {
            Some(patch) => Ok((self.id, patch)),
            None => Err(format!("Body has no value for field '{}'", field.as_str())),
        }
    }
}

/// Id and price, from the query string or a JSON body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PriceLookupRequest {
    #[serde(alias = "str_item_id")]
    #[validate(custom(function = "validate_item_id"))]
    pub item_id: ItemId,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemListResponse {
    pub count: usize,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemTotalResponse {
    pub items: usize,
}
