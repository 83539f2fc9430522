// Utility functions module
pub mod config;
pub mod i18n;
