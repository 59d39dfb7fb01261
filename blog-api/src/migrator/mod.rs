mod m00000000_000001_create_users_table;
mod m00000000_000002_create_author_profiles_table;
mod m00000000_000003_create_posts_table;
mod m00000000_000004_create_comments_table;
mod m00000000_000005_create_post_likes_table;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DbBackend;
pub struct Migrator;

/// Non-null timestamp column with sub-second precision. MySQL's bare
/// `DATETIME` keeps whole seconds only.
pub(crate) fn timestamp_column(manager: &SchemaManager, column: impl IntoIden) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    match manager.get_database_backend() {
        DbBackend::MySql => def.custom(Alias::new("DATETIME(6)")),
        _ => def.date_time(),
    };
    def.not_null();
    def
}

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m00000000_000001_create_users_table::Migration {}),
            Box::new(m00000000_000002_create_author_profiles_table::Migration {}),
            Box::new(m00000000_000003_create_posts_table::Migration {}),
            Box::new(m00000000_000004_create_comments_table::Migration {}),
            Box::new(m00000000_000005_create_post_likes_table::Migration {}),
        ]
    }
}
