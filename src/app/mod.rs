// FlowTrace - app/mod.rs
//
// Application layer: log retrieval and terminal rendering around the core.
// Dependencies: core layer.

pub mod reader;
pub mod render;
