// src/lib.rs

use axum::{
    routing::{get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
}

pub mod entities {
    pub mod prelude;
    pub mod portfolios;
    pub mod profiles;
    pub mod sessions;
    pub mod stocks;
    pub mod trades;
    pub mod users;
}

pub mod services {
    pub mod accounting;
    pub mod auth;
    pub mod maintenance;
    pub mod portfolio;
    pub mod trading;
}

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod templates;

/// Every route of the application, behind the login middleware
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard::dashboard))
        .route(
            "/trade",
            get(handlers::trade::trade_page).post(handlers::trade::submit_trade),
        )
        .route("/portfolio", get(handlers::portfolio::portfolio_view))
        .route("/analytics", get(handlers::analytics::analytics_view))
        .route("/quick_trade", post(handlers::quick_trade::quick_trade))
        .route(
            "/login",
            get(handlers::auth::login_page).post(handlers::auth::login_submit),
        )
        .route(
            "/register",
            get(handlers::auth::register_page).post(handlers::auth::register_submit),
        )
        .route(
            "/logout",
            get(handlers::auth::logout).post(handlers::auth::logout),
        )
        .route("/admin/stocks", get(handlers::admin::list_stocks))
        .route(
            "/admin/stocks/{symbol}",
            put(handlers::admin::update_stock_price),
        )
        .route("/admin/trades", get(handlers::admin::list_trades))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::require_login,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
