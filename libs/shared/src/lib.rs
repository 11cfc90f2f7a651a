pub mod auth_manager;
pub mod local_auth;
pub mod models;
pub mod oauth;
pub mod storage;
pub mod tls_client;
