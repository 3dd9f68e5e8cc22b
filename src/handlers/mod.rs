pub mod auth_handlers;
pub mod health_handlers;
