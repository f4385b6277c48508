use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

/// Item identifier. Clients may send either a JSON string or an integer and get
/// the same form back; both forms with the same text address the same record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl ItemId {
    /// Textual key used for lookups and storage keys
    pub fn key(&self) -> String {
        match self {
            ItemId::Number(n) => n.to_string(),
            ItemId::Text(s) => s.clone(),
        }
    }

    /// The integer value when the key is a canonical `i64`
    pub fn as_number(&self) -> Option<i64> {
        match self {
            ItemId::Number(n) => Some(*n),
            ItemId::Text(s) => canonical_i64(s),
        }
    }
}

fn canonical_i64(s: &str) -> Option<i64> {
    s.parse::<i64>().ok().filter(|n| n.to_string() == s)
}

impl PartialEq for ItemId {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ItemId {}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{}", n),
            ItemId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for ItemId {
    /// Path segments carry no JSON type, so canonical integers become `Number`.
    fn from(s: &str) -> Self {
        match canonical_i64(s) {
            Some(n) => ItemId::Number(n),
            None => ItemId::Text(s.to_string()),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        ItemId::Number(n)
    }
}

pub(crate) fn validate_item_id(id: &ItemId) -> Result<(), ValidationError> {
    match id {
        ItemId::Text(s) if s.trim().is_empty() => {
            let mut err = ValidationError::new("empty_id");
            err.message = Some("id cannot be empty".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Clothes,
    Grocery,
    Tools,
    Consumables,
}

/// A catalog record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Item {
    #[validate(custom(function = "validate_item_id"))]
    pub id: ItemId,
    pub description: String,
    #[validate(range(min = 0.0, message = "price cannot be negative"))]
    pub price: f64,
    pub quantity: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// Field names accepted by the PATCH routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchField {
    Price,
    Quantity,
    Description,
}

impl PatchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchField::Price => "price",
            PatchField::Quantity => "quantity",
            PatchField::Description => "description",
        }
    }
}

impl FromStr for PatchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(PatchField::Price),
            "quantity" => Ok(PatchField::Quantity),
            "description" => Ok(PatchField::Description),
            other => Err(format!(
                "Unknown field '{}', expected one of: price, quantity, description",
                other
            )),
        }
    }
}

/// A single-field update
#[derive(Debug, Clone, PartialEq)]
pub enum ItemPatch {
    Price(f64),
    Quantity(u64),
    Description(String),
}

impl ItemPatch {
    pub fn field(&self) -> PatchField {
        match self {
            ItemPatch::Price(_) => PatchField::Price,
            ItemPatch::Quantity(_) => PatchField::Quantity,
            ItemPatch::Description(_) => PatchField::Description,
        }
    }

    pub fn apply(&self, item: &mut Item) {
        match self {
            ItemPatch::Price(price) => item.price = *price,
            ItemPatch::Quantity(quantity) => item.quantity = *quantity,
            ItemPatch::Description(description) => item.description = description.clone(),
        }
    }

    /// The new value as it is stored
    pub fn json_value(&self) -> serde_json::Value {
        match self {
            ItemPatch::Price(price) => serde_json::json!(price),
            ItemPatch::Quantity(quantity) => serde_json::json!(quantity),
            ItemPatch::Description(description) => serde_json::json!(description),
        }
    }
}

/// The four records the demo server ships with
pub fn demo_catalog() -> Vec<Item> {
    vec![
        Item {
            id: ItemId::Number(100),
            description: "Hammer".to_string(),
            price: 9.99,
            quantity: 20,
            category: Some(Category::Tools),
        },
        Item {
            id: ItemId::Number(101),
            description: "Jeans".to_string(),
            price: 39.99,
            quantity: 100,
            category: Some(Category::Clothes),
        },
        Item {
            id: ItemId::Number(102),
            description: "Apple".to_string(),
            price: 0.50,
            quantity: 150,
            category: Some(Category::Grocery),
        },
        Item {
            id: ItemId::Number(103),
            description: "Radio AM/FM".to_string(),
            price: 25.49,
            quantity: 5,
            category: Some(Category::Consumables),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_keeps_its_json_form() {
        let item: Item = serde_json::from_value(json!({
            "id": 100, "description": "Hammer", "price": 9.99, "quantity": 20
        }))
        .unwrap();
        assert_eq!(item.id, ItemId::Number(100));
        assert_eq!(serde_json::to_value(&item).unwrap()["id"], json!(100));

        let item: Item = serde_json::from_value(json!({
            "id": "100", "description": "Hammer", "price": 9.99, "quantity": 20
        }))
        .unwrap();
        assert!(matches!(item.id, ItemId::Text(_)));
        assert_eq!(serde_json::to_value(&item).unwrap()["id"], json!("100"));
    }

    #[test]
    fn test_number_and_text_ids_are_the_same_key() {
        assert_eq!(ItemId::Number(100), ItemId::Text("100".to_string()));
        assert_ne!(ItemId::Number(100), ItemId::Text("0100".to_string()));
    }

    #[test]
    fn test_path_segment_parsing() {
        assert_eq!(ItemId::from("42"), ItemId::Number(42));
        assert!(matches!(ItemId::from("007"), ItemId::Text(_)));
        assert!(matches!(ItemId::from("abc"), ItemId::Text(_)));
    }

    #[test]
    fn test_category_is_optional_and_lowercase() {
        let item: Item = serde_json::from_value(json!({
            "id": 1, "description": "Nails", "price": 1.0, "quantity": 3, "category": "tools"
        }))
        .unwrap();
        assert_eq!(item.category, Some(Category::Tools));

        let plain = Item { category: None, ..item };
        let value = serde_json::to_value(&plain).unwrap();
        assert!(value.get("category").is_none());
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let result: Result<Item, _> = serde_json::from_value(json!({
            "id": 1, "description": "Nails", "price": 1.0, "quantity": 3, "category": "toys"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_values_are_rejected() {
        let negative_quantity: Result<Item, _> = serde_json::from_value(json!({
            "id": 1, "description": "Nails", "price": 1.0, "quantity": -3
        }));
        assert!(negative_quantity.is_err());

        let negative_price: Item = serde_json::from_value(json!({
            "id": 1, "description": "Nails", "price": -1.0, "quantity": 3
        }))
        .unwrap();
        assert!(negative_price.validate().is_err());
    }

    #[test]
    fn test_empty_text_id_is_invalid() {
        let item: Item = serde_json::from_value(json!({
            "id": " ", "description": "Nails", "price": 1.0, "quantity": 3
        }))
        .unwrap();
        assert!(item.validate().is_err());
    }

    #[test]
    fn test_patch_apply() {
        let mut item = demo_catalog().remove(0);
        ItemPatch::Price(12.5).apply(&mut item);
        ItemPatch::Description("Claw hammer".to_string()).apply(&mut item);
        assert_eq!(item.price, 12.5);
        assert_eq!(item.description, "Claw hammer");
        assert_eq!(item.quantity, 20);
    }

    #[test]
    fn test_patch_field_parsing() {
        assert_eq!("quantity".parse::<PatchField>().unwrap(), PatchField::Quantity);
        assert!("category".parse::<PatchField>().is_err());
    }
}
