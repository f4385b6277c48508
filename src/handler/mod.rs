pub mod http_handler;
pub mod item_handler;
pub mod user_handler;
