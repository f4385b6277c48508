pub mod error;
pub mod jwt;
pub mod logger;
pub mod password;
pub mod redis;
pub mod validated_json;
