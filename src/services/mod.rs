pub mod validators;
pub mod schema;
pub mod generator;
pub mod conversation;
pub mod session_store;
pub mod export;
pub mod telegram;
