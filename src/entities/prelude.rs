//! `SeaORM` Entity prelude

pub use super::portfolios::Entity as Portfolios;
pub use super::profiles::Entity as Profiles;
pub use super::sessions::Entity as Sessions;
pub use super::stocks::Entity as Stocks;
pub use super::trades::Entity as Trades;
pub use super::users::Entity as Users;
