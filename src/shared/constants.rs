use crate::modules::assistant::AttachmentTool;

/// Maximum uploaded artifact size in bytes (20MB)
pub const MAX_ARTIFACT_SIZE: usize = 20 * 1024 * 1024;

/// File name used when the client does not send one
pub const DEFAULT_ARTIFACT_FILE_NAME: &str = "file";

/// Media type assumed when the client does not declare one
pub const DEFAULT_ARTIFACT_MEDIA_TYPE: &str = "application/octet-stream";

/// Remote tool an uploaded artifact is attached to
pub const ARTIFACT_ATTACHMENT_TOOL: AttachmentTool = AttachmentTool::CodeInterpreter;

/// Frames buffered between the run driver and the SSE response
pub const RELAY_CHANNEL_CAPACITY: usize = 64;

/// Interval between SSE keep-alive comments
pub const SSE_KEEP_ALIVE_SECS: u64 = 15;
