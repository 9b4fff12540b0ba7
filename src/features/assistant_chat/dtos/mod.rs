pub mod assistant_dto;
pub mod chat_dto;

pub use assistant_dto::{AssistantResponseDto, CreateAssistantRequestDto};
pub use chat_dto::{ArtifactInput, ChatRequestDto, ChatRequestForm};
