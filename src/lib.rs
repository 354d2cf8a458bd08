pub mod config;
pub mod error;
pub mod models;
pub mod my_utils;
pub mod recognition;
