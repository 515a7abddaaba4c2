//! Backend interaction for the Higia client.

pub mod http_backend;

pub use crate::http_backend::HttpBackendClient;
