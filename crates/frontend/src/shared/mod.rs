pub mod api_utils;
pub mod app_config;
pub mod components;
pub mod export;
pub mod filter_storage;
pub mod icons;
pub mod modal;
