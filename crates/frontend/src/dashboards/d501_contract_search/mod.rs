pub mod api;
pub mod orchestrator;
pub mod state;
pub mod ui;
