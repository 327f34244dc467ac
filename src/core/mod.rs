// FlowTrace - core/mod.rs
//
// Core business logic layer.
// Must NOT depend on: app, I/O, or terminal rendering.

pub mod export;
pub mod filter;
pub mod model;
pub mod parser;
pub mod summary;
