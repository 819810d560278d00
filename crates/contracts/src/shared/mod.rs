pub mod chip_payload;
pub mod config;
pub mod pagination;
