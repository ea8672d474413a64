pub mod document;
pub mod ws;
