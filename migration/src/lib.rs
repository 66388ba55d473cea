pub use sea_orm_migration::prelude::*;

mod m20261019_000001_create_users_and_profiles;
mod m20261019_000002_create_sessions;
mod m20261019_000003_create_stocks;
mod m20261019_000004_create_trades;
mod m20261019_000005_create_portfolios;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_create_users_and_profiles::Migration),
            Box::new(m20261019_000002_create_sessions::Migration),
            Box::new(m20261019_000003_create_stocks::Migration),
            Box::new(m20261019_000004_create_trades::Migration),
            Box::new(m20261019_000005_create_portfolios::Migration),
        ]
    }
}
