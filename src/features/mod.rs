pub mod assistant_chat;
