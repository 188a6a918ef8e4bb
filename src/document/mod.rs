// src/document/mod.rs
pub mod models;
pub mod source;

pub use source::load_document;
