pub mod admin;
pub mod analytics;
pub mod auth;
pub mod dashboard;
pub mod portfolio;
pub mod quick_trade;
pub mod trade;
