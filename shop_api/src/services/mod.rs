pub mod auth_service;
pub mod customers;
pub mod email_mock;
pub mod sessions;
