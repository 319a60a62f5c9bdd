pub mod admin;
pub mod auth;
pub mod records;
pub mod routes;
pub mod settings;
