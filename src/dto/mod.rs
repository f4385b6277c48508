pub mod item_dto;
pub mod user_dto;
