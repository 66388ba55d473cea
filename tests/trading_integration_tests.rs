mod common;

use common::*;
use papertrade_backend::error::TradeError;
use papertrade_backend::models::trade::TradeSide;
use papertrade_backend::services::auth::CurrentUser;
use papertrade_backend::services::{portfolio, trading};
use rust_decimal_macros::dec;

fn current_user(id: i32, username: &str) -> CurrentUser {
    CurrentUser {
        id,
        username: username.to_string(),
        session_id: 0,
    }
}

#[tokio::test]
async fn test_buy_debits_balance_and_opens_position() {
    let db = setup_test_db().await.expect("Failed to set up test DB");
    let user_id = create_user(&db, "buyer", dec!(10000)).await;
    let stock = create_stock(&db, "NABIL", dec!(1000), dec!(950)).await;

    let receipt = trading::place_trade(&db, user_id, stock.id, TradeSide::Buy, 1)
        .await
        .expect("Buy should succeed");

    assert_eq!(receipt.side, TradeSide::Buy);
    assert_eq!(receipt.new_balance, dec!(9000));
    assert_eq!(receipt.realized_profit_loss, None);
    assert_eq!(receipt.message(), "Successfully bought 1 shares of NABIL");
    assert_eq!(balance_of(&db, user_id).await, dec!(9000));

    let position = position_of(&db, user_id, stock.id)
        .await
        .expect("Position should exist");
    assert_eq!(position.quantity, 1);
    assert_eq!(position.average_buy_price, dec!(1000));

    assert_eq!(receipt.trade.trade_type, "BUY");
    assert_eq!(receipt.trade.price, dec!(1000));
    assert_eq!(trade_count(&db, user_id).await, 1);
}

#[tokio::test]
async fn test_second_buy_recomputes_weighted_average() {
    let db = setup_test_db().await.expect("Failed to set up test DB");
    let user_id = create_user(&db, "averager", dec!(100000)).await;
    let stock = create_stock(&db, "NICA", dec!(900), dec!(900)).await;

    trading::place_trade(&db, user_id, stock.id, TradeSide::Buy, 10)
        .await
        .expect("First buy should succeed");
    set_price(&db, &stock, dec!(1000)).await;
    trading::place_trade(&db, user_id, stock.id, TradeSide::Buy, 10)
        .await
        .expect("Second buy should succeed");

    let position = position_of(&db, user_id, stock.id).await.unwrap();
    assert_eq!(position.quantity, 20);
    assert_eq!(position.average_buy_price, dec!(950));
    assert_eq!(balance_of(&db, user_id).await, dec!(81000));
}

#[tokio::test]
async fn test_buy_rejected_without_funds() {
    let db = setup_test_db().await.expect("Failed to set up test DB");
    let user_id = create_user(&db, "broke", dec!(500)).await;
    let stock = create_stock(&db, "NABIL", dec!(1000), dec!(950)).await;

    let result = trading::place_trade(&db, user_id, stock.id, TradeSide::Buy, 1).await;

    assert!(matches!(result, Err(TradeError::InsufficientFunds { .. })));
    assert_eq!(balance_of(&db, user_id).await, dec!(500));
    assert!(position_of(&db, user_id, stock.id).await.is_none());
    assert_eq!(trade_count(&db, user_id).await, 0);
}

#[tokio::test]
async fn test_selling_more_than_held_changes_nothing() {
    let db = setup_test_db().await.expect("Failed to set up test DB");
    let user_id = create_user(&db, "oversell", dec!(10000)).await;
    let stock = create_stock(&db, "NABIL", dec!(1000), dec!(950)).await;

    trading::place_trade(&db, user_id, stock.id, TradeSide::Buy, 2)
        .await
        .expect("Buy should succeed");

    let result = trading::place_trade(&db, user_id, stock.id, TradeSide::Sell, 3).await;

    match result {
        Err(TradeError::InsufficientShares { held, requested, .. }) => {
            assert_eq!(held, 2);
            assert_eq!(requested, 3);
        }
        other => panic!("Expected InsufficientShares, got {:?}", other),
    }
    assert_eq!(balance_of(&db, user_id).await, dec!(8000));
    assert_eq!(position_of(&db, user_id, stock.id).await.unwrap().quantity, 2);
    assert_eq!(trade_count(&db, user_id).await, 1);
}

#[tokio::test]
async fn test_selling_unowned_stock_is_reported_as_not_owned() {
    let db = setup_test_db().await.expect("Failed to set up test DB");
    let user_id = create_user(&db, "shorter", dec!(10000)).await;
    let stock = create_stock(&db, "SCB", dec!(400), dec!(400)).await;

    let err = trading::place_trade(&db, user_id, stock.id, TradeSide::Sell, 1)
        .await
        .unwrap_err();

    assert!(matches!(err, TradeError::NotOwned(ref symbol) if symbol == "SCB"));
    assert!(err.to_string().contains("do not own"));
    assert_eq!(balance_of(&db, user_id).await, dec!(10000));
}

#[tokio::test]
async fn test_selling_everything_deletes_position_and_books_profit() {
    let db = setup_test_db().await.expect("Failed to set up test DB");
    let user_id = create_user(&db, "seller", dec!(10000)).await;
    let stock = create_stock(&db, "NABIL", dec!(1000), dec!(950)).await;

    trading::place_trade(&db, user_id, stock.id, TradeSide::Buy, 5)
        .await
        .expect("Buy should succeed");
    set_price(&db, &stock, dec!(1100)).await;

    let receipt = trading::place_trade(&db, user_id, stock.id, TradeSide::Sell, 5)
        .await
        .expect("Sell should succeed");

    assert_eq!(receipt.side, TradeSide::Sell);
    assert_eq!(receipt.new_balance, dec!(10500));
    assert_eq!(receipt.realized_profit_loss, Some(dec!(500)));
    assert!(receipt.position.is_none());
    assert!(position_of(&db, user_id, stock.id).await.is_none());
    assert_eq!(balance_of(&db, user_id).await, dec!(10500));
    assert_eq!(trade_count(&db, user_id).await, 2);
}

#[tokio::test]
async fn test_partial_sell_keeps_average_price() {
    let db = setup_test_db().await.expect("Failed to set up test DB");
    let user_id = create_user(&db, "trimmer", dec!(10000)).await;
    let stock = create_stock(&db, "NABIL", dec!(1000), dec!(950)).await;

    trading::place_trade(&db, user_id, stock.id, TradeSide::Buy, 4)
        .await
        .unwrap();
    set_price(&db, &stock, dec!(800)).await;
    let receipt = trading::place_trade(&db, user_id, stock.id, TradeSide::Sell, 1)
        .await
        .unwrap();

    assert_eq!(receipt.realized_profit_loss, Some(dec!(-200)));
    let position = position_of(&db, user_id, stock.id).await.unwrap();
    assert_eq!(position.quantity, 3);
    assert_eq!(position.average_buy_price, dec!(1000));
    assert_eq!(balance_of(&db, user_id).await, dec!(6800));
}

#[tokio::test]
async fn test_invalid_quantity_and_unknown_stock() {
    let db = setup_test_db().await.expect("Failed to set up test DB");
    let user_id = create_user(&db, "sloppy", dec!(10000)).await;
    let stock = create_stock(&db, "NABIL", dec!(1000), dec!(950)).await;

    let zero = trading::place_trade(&db, user_id, stock.id, TradeSide::Buy, 0).await;
    assert!(matches!(zero, Err(TradeError::InvalidQuantity(0))));

    let missing = trading::place_trade(&db, user_id, 9999, TradeSide::Buy, 1).await;
    assert!(matches!(missing, Err(TradeError::StockNotFound(_))));

    assert_eq!(balance_of(&db, user_id).await, dec!(10000));
    assert_eq!(trade_count(&db, user_id).await, 0);
}

#[tokio::test]
async fn test_validate_trade_has_no_side_effects() {
    let db = setup_test_db().await.expect("Failed to set up test DB");
    let user_id = create_user(&db, "checker", dec!(10000)).await;
    let stock = create_stock(&db, "NABIL", dec!(1000), dec!(950)).await;

    trading::validate_trade(&db, user_id, &stock, TradeSide::Buy, 10, stock.current_price)
        .await
        .expect("Exactly affordable buy should validate");
    let too_much =
        trading::validate_trade(&db, user_id, &stock, TradeSide::Buy, 11, stock.current_price)
            .await;
    assert!(matches!(too_much, Err(TradeError::InsufficientFunds { .. })));

    assert_eq!(balance_of(&db, user_id).await, dec!(10000));
    assert!(position_of(&db, user_id, stock.id).await.is_none());
}

#[tokio::test]
async fn test_dashboard_reports_todays_change() {
    let db = setup_test_db().await.expect("Failed to set up test DB");
    let user_id = create_user(&db, "watcher", dec!(5000)).await;
    let stock = create_stock(&db, "NABIL", dec!(1000), dec!(950)).await;
    create_stock(&db, "ADBL", dec!(300), dec!(310)).await;
    create_position(&db, user_id, stock.id, 10, dec!(900)).await;

    let context = portfolio::dashboard_context(&db, &current_user(user_id, "watcher"))
        .await
        .unwrap();

    assert_eq!(context.balance, dec!(5000));
    assert_eq!(context.total_invested, dec!(9000));
    assert_eq!(context.total_value, dec!(10000));
    assert_eq!(context.todays_pl, dec!(500));
    assert_eq!(context.positions.len(), 1);
    assert_eq!(context.positions[0].profit_loss, dec!(1000));
    assert_eq!(context.market.len(), 2);
    assert_eq!(context.market[0].symbol, "ADBL");
}

#[tokio::test]
async fn test_portfolio_totals_with_empty_book() {
    let db = setup_test_db().await.expect("Failed to set up test DB");
    let user_id = create_user(&db, "newbie", dec!(5000)).await;

    let context = portfolio::portfolio_context(&db, &current_user(user_id, "newbie"))
        .await
        .unwrap();

    assert!(context.positions.is_empty());
    assert_eq!(context.total_invested, dec!(0));
    assert_eq!(context.total_pl_percentage, dec!(0));
}

#[tokio::test]
async fn test_analytics_counts_and_win_rate() {
    let db = setup_test_db().await.expect("Failed to set up test DB");
    let user_id = create_user(&db, "analyst", dec!(100000)).await;
    let winner = create_stock(&db, "NABIL", dec!(1000), dec!(1000)).await;
    let loser = create_stock(&db, "NICA", dec!(500), dec!(500)).await;

    trading::place_trade(&db, user_id, winner.id, TradeSide::Buy, 2)
        .await
        .unwrap();
    trading::place_trade(&db, user_id, loser.id, TradeSide::Buy, 2)
        .await
        .unwrap();
    set_price(&db, &winner, dec!(1200)).await;
    set_price(&db, &loser, dec!(400)).await;
    trading::place_trade(&db, user_id, winner.id, TradeSide::Sell, 1)
        .await
        .unwrap();
    trading::place_trade(&db, user_id, loser.id, TradeSide::Sell, 1)
        .await
        .unwrap();

    let context = portfolio::analytics_context(&db, &current_user(user_id, "analyst"))
        .await
        .unwrap();

    assert_eq!(context.total_trades, 4);
    assert_eq!(context.buy_trades, 2);
    assert_eq!(context.sell_trades, 2);
    assert_eq!(context.trades.len(), 4);
    assert_eq!(context.win_rate.winning_trades, 1);
    assert_eq!(context.win_rate.losing_trades, 1);
    assert_eq!(context.win_rate.win_rate, dec!(50));
    assert_eq!(
        context.total_portfolio_value,
        context.total_current + context.balance
    );
}

#[tokio::test]
async fn test_trade_page_preselects_symbol_case_insensitively() {
    let db = setup_test_db().await.expect("Failed to set up test DB");
    let user_id = create_user(&db, "picker", dec!(5000)).await;
    let stock = create_stock(&db, "NABIL", dec!(1000), dec!(950)).await;

    let context =
        portfolio::trade_page_context(&db, &current_user(user_id, "picker"), Some("nabil"))
            .await
            .unwrap();
    assert_eq!(context.selected_stock.map(|s| s.id), Some(stock.id));

    let context =
        portfolio::trade_page_context(&db, &current_user(user_id, "picker"), Some("UNKNOWN"))
            .await
            .unwrap();
    assert!(context.selected_stock.is_none());
}

#[tokio::test]
async fn test_concurrent_buy_and_sell_queue_instead_of_deadlocking() {
    // Row locks are a no-op on SQLite
    if !postgres_configured() {
        return;
    }

    let db = setup_pooled_test_db(16)
        .await
        .expect("Failed to set up test DB");
    let user_id = create_user(&db, "racer", dec!(100000)).await;
    let stock = create_stock(&db, "NABIL", dec!(100), dec!(100)).await;
    create_position(&db, user_id, stock.id, 1000, dec!(100)).await;

    let mut failures = Vec::new();
    for _ in 0..100 {
        let (buy, sell) = tokio::join!(
            trading::place_trade(&db, user_id, stock.id, TradeSide::Buy, 1),
            trading::place_trade(&db, user_id, stock.id, TradeSide::Sell, 1),
        );
        failures.extend(buy.err().map(|e| e.to_string()));
        failures.extend(sell.err().map(|e| e.to_string()));
    }

    assert!(failures.is_empty(), "Concurrent trades failed: {:?}", failures);
    assert_eq!(trade_count(&db, user_id).await, 200);
    assert_eq!(position_of(&db, user_id, stock.id).await.unwrap().quantity, 1000);
    assert_eq!(balance_of(&db, user_id).await, dec!(100000));
}

#[tokio::test]
async fn test_concurrent_buys_never_overspend() {
    if !postgres_configured() {
        return;
    }

    let db = setup_pooled_test_db(16)
        .await
        .expect("Failed to set up test DB");
    let user_id = create_user(&db, "spender", dec!(1000)).await;
    let stock = create_stock(&db, "NABIL", dec!(100), dec!(100)).await;

    let mut attempts = tokio::task::JoinSet::new();
    for _ in 0..20 {
        let db = db.clone();
        let stock_id = stock.id;
        attempts.spawn(async move {
            trading::place_trade(&db, user_id, stock_id, TradeSide::Buy, 1).await
        });
    }
    let results = attempts.join_all().await;

    let filled = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(filled, 10);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, TradeError::InsufficientFunds { .. })));
    assert_eq!(balance_of(&db, user_id).await, dec!(0));
    assert_eq!(position_of(&db, user_id, stock.id).await.unwrap().quantity, 10);
}
