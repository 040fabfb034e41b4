//! Schema migrations, applied at startup and by the test harness.

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_cinema_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_create_cinema_tables::Migration)]
    }
}
