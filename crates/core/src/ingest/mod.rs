pub mod error;
pub mod provider;
pub mod service;
pub mod types;
