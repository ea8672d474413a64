/// Persistence abstraction for per-channel documents.
pub mod channel_store;
/// JSON-file storage backend.
pub mod file_store;
/// Storage error types shared across backends.
pub mod storage;
