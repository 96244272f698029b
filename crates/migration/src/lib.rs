pub use sea_orm_migration::prelude::*;

mod m20260110_090000_wallets;
mod m20260110_091500_transactions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260110_090000_wallets::Migration),
            Box::new(m20260110_091500_transactions::Migration),
        ]
    }
}
