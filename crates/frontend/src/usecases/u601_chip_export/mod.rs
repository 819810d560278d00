pub mod api;
pub mod controller;
pub mod view;

pub use controller::ExportController;
pub use view::{ExportButton, ExportModal};
