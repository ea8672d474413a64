/// Per-channel persistence write serialization.
pub mod storage_writer;
/// WebSocket connection and message handling service.
pub mod websocket_service;
