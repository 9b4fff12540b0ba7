pub mod assistant_handler;
pub mod chat_handler;
