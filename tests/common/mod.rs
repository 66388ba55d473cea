#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use chrono::Utc;
use papertrade_backend::{
    build_router,
    config::Config,
    entities::{portfolios, profiles, stocks, trades},
    services::auth,
    AppState,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use sea_orm_migration::MigratorTrait;
use std::env;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "password123";
pub const ADMIN_KEY: &str = "test-admin-key";

fn test_database_url() -> String {
    env::var("TEST_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string())
}

/// True when TEST_DATABASE_URL points at a Postgres server
pub fn postgres_configured() -> bool {
    let url = test_database_url();
    url.starts_with("postgres://") || url.starts_with("postgresql://")
}

/// Set up a migrated test database
/// Uses TEST_DATABASE_URL environment variable or falls back to in-memory SQLite
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    connect_test_db(1).await
}

/// Like [`setup_test_db`] but with a pool wide enough for concurrent
/// transactions; only meaningful on Postgres
pub async fn setup_pooled_test_db(max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    connect_test_db(max_connections).await
}

async fn connect_test_db(max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let database_url = test_database_url();
    let mut options = ConnectOptions::new(database_url.clone());
    options.min_connections(1).sqlx_logging(false);

    if postgres_configured() {
        // Each test migrates into its own schema on the shared server
        let schema = format!("test_{}", Uuid::new_v4().simple());
        let admin = Database::connect(&database_url).await?;
        admin
            .execute_unprepared(&format!("CREATE SCHEMA \"{}\"", schema))
            .await?;
        admin.close().await?;

        options
            .max_connections(max_connections)
            .set_schema_search_path(schema);
    } else {
        // A single connection keeps every query on the same in-memory database
        options.max_connections(1);
    }

    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn test_state(db: DatabaseConnection) -> AppState {
    let mut config = Config::for_database("sqlite::memory:");
    config.admin_api_key = Some(ADMIN_KEY.to_string());

    AppState {
        db,
        config: Arc::new(config),
    }
}

pub async fn test_app() -> (Router, AppState) {
    let db = setup_test_db().await.expect("Failed to set up test DB");
    let state = test_state(db);
    (build_router(state.clone()), state)
}

/// Register a user whose profile holds `balance`; returns the user id
pub async fn create_user(db: &DatabaseConnection, username: &str, balance: Decimal) -> i32 {
    auth::register_user(db, username, TEST_PASSWORD, balance)
        .await
        .expect("Failed to register user")
        .id
}

pub async fn create_stock(
    db: &DatabaseConnection,
    symbol: &str,
    current_price: Decimal,
    previous_close: Decimal,
) -> stocks::Model {
    stocks::ActiveModel {
        symbol: Set(symbol.to_string()),
        name: Set(format!("{} Ltd.", symbol)),
        current_price: Set(current_price),
        previous_close: Set(previous_close),
        last_updated: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create stock")
}

pub async fn set_price(db: &DatabaseConnection, stock: &stocks::Model, price: Decimal) {
    let mut active: stocks::ActiveModel = stock.clone().into();
    active.current_price = Set(price);
    active.update(db).await.expect("Failed to reprice stock");
}

pub async fn create_position(
    db: &DatabaseConnection,
    user_id: i32,
    stock_id: i32,
    quantity: i32,
    average_buy_price: Decimal,
) -> portfolios::Model {
    portfolios::ActiveModel {
        user_id: Set(user_id),
        stock_id: Set(stock_id),
        quantity: Set(quantity),
        average_buy_price: Set(average_buy_price),
        last_updated: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create position")
}

pub async fn balance_of(db: &DatabaseConnection, user_id: i32) -> Decimal {
    profiles::Entity::find()
        .filter(profiles::Column::UserId.eq(user_id))
        .one(db)
        .await
        .expect("Failed to load profile")
        .expect("Profile should exist")
        .balance
}

pub async fn position_of(
    db: &DatabaseConnection,
    user_id: i32,
    stock_id: i32,
) -> Option<portfolios::Model> {
    portfolios::Entity::find()
        .filter(portfolios::Column::UserId.eq(user_id))
        .filter(portfolios::Column::StockId.eq(stock_id))
        .one(db)
        .await
        .expect("Failed to load position")
}

pub async fn trade_count(db: &DatabaseConnection, user_id: i32) -> u64 {
    trades::Entity::find()
        .filter(trades::Column::UserId.eq(user_id))
        .count(db)
        .await
        .expect("Failed to count trades")
}

/// Open a session for `user_id` and return the matching `Cookie` header value
pub async fn session_cookie_for(db: &DatabaseConnection, user_id: i32) -> String {
    let session = auth::create_session(db, user_id, 1)
        .await
        .expect("Failed to create session");
    format!("{}={}", auth::SESSION_COOKIE, session.token)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn post_json(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
