//! Data maintenance used by the `seed_stocks` and `fix_profiles` binaries

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use std::collections::HashSet;
use tracing::info;

use crate::entities::{profiles, stocks, users};
use crate::services::accounting::round_money;
use crate::services::auth::create_profile;

/// Symbol, company name, reference price
pub const NEPSE_LISTINGS: &[(&str, &str, Decimal)] = &[
    // Commercial Banks
    ("NABIL", "Nabil Bank Ltd.", dec!(1250.00)),
    ("NICA", "NIC Asia Bank Ltd.", dec!(780.50)),
    ("EBL", "Everest Bank Ltd.", dec!(540.00)),
    ("SCB", "Standard Chartered Bank Nepal", dec!(515.00)),
    ("GIME", "Global IME Bank Ltd.", dec!(198.00)),
    ("NBL", "Nepal Bank Ltd.", dec!(245.00)),
    // Development Banks
    ("MNBBL", "Muktinath Bikas Bank Ltd.", dec!(340.00)),
    ("GBBL", "Garima Bikas Bank Ltd.", dec!(310.00)),
    // Hydropower
    ("HIDCL", "Hydroelectricity Investment & Dev. Co.", dec!(185.00)),
    ("CHCL", "Chilime Hydropower Company", dec!(450.00)),
    ("API", "Api Power Company Ltd.", dec!(160.00)),
    ("UPPER", "Upper Tamakoshi Hydropower", dec!(210.00)),
    ("SHPC", "Sanima Mai Hydropower", dec!(320.00)),
    // Life Insurance
    ("NLIC", "Nepal Life Insurance Co. Ltd.", dec!(650.00)),
    ("LICN", "Life Insurance Co. Nepal", dec!(1100.00)),
    ("ALICL", "Asian Life Insurance Co.", dec!(580.00)),
    // Non-Life Insurance
    ("NIL", "Neco Insurance Ltd.", dec!(820.00)),
    ("SICL", "Shikhar Insurance Co. Ltd.", dec!(890.00)),
    // Others
    ("NTC", "Nepal Telecom", dec!(880.00)),
    ("CIT", "Citizen Investment Trust", dec!(2200.00)),
    ("HDL", "Himalayan Distillery Ltd.", dec!(1450.00)),
    ("STC", "Salt Trading Corporation", dec!(4500.00)),
    ("UNL", "Unilever Nepal Ltd.", dec!(38000.00)),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub updated: usize,
}

/// Simulated previous close within ±2% of `price`
pub fn simulated_previous_close<R: Rng>(price: Decimal, rng: &mut R) -> Decimal {
    let factor = Decimal::from_f64(rng.gen_range(0.98..=1.02)).unwrap_or(Decimal::ONE);
    round_money(price * factor)
}

/// Insert missing listings and refresh name/price of existing ones
///
/// A previous close is only simulated for new rows or rows that have none.
pub async fn seed_stocks<R: Rng>(
    db: &DatabaseConnection,
    listings: &[(&str, &str, Decimal)],
    rng: &mut R,
) -> Result<SeedReport, DbErr> {
    let mut report = SeedReport::default();
    let now = Utc::now().fixed_offset();

    for &(symbol, name, price) in listings {
        let existing = stocks::Entity::find()
            .filter(stocks::Column::Symbol.eq(symbol))
            .one(db)
            .await?;

        match existing {
            Some(stock) => {
                let needs_previous_close = stock.previous_close.is_zero();
                let mut active: stocks::ActiveModel = stock.into();
                active.name = Set(name.to_string());
                active.current_price = Set(price);
                if needs_previous_close {
                    active.previous_close = Set(simulated_previous_close(price, rng));
                }
                active.last_updated = Set(now);
                active.update(db).await?;
                info!(symbol, "Updated stock");
                report.updated += 1;
            }
            None => {
                stocks::ActiveModel {
                    symbol: Set(symbol.to_string()),
                    name: Set(name.to_string()),
                    current_price: Set(price),
                    previous_close: Set(simulated_previous_close(price, rng)),
                    last_updated: Set(now),
                    ..Default::default()
                }
                .insert(db)
                .await?;
                info!(symbol, "Created stock");
                report.created += 1;
            }
        }
    }

    Ok(report)
}

/// Give every user without a profile a fresh one; returns how many were created
pub async fn repair_profiles(
    db: &DatabaseConnection,
    starting_balance: Decimal,
) -> Result<usize, DbErr> {
    let users = users::Entity::find().all(db).await?;
    let with_profile: HashSet<i32> = profiles::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|profile| profile.user_id)
        .collect();

    info!("Checking {} users...", users.len());

    let mut created = 0;
    for user in users.iter().filter(|user| !with_profile.contains(&user.id)) {
        create_profile(db, user.id, starting_balance).await?;
        info!(username = %user.username, "Created missing profile");
        created += 1;
    }

    Ok(created)
}
