use sea_orm_migration::prelude::*;

use super::m00000000_000001_create_users_table::Users;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m00000000_000002_create_author_profiles_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(AuthorProfiles::Table)
                    .col(
                        ColumnDef::new(AuthorProfiles::ProfileId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AuthorProfiles::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-author_profiles-user_id")
                            .from(AuthorProfiles::Table, AuthorProfiles::UserId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .col(ColumnDef::new(AuthorProfiles::Bio).text().not_null())
                    .col(ColumnDef::new(AuthorProfiles::Picture).text().null())
                    .to_owned(),
            )
            .await
    }
    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuthorProfiles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum AuthorProfiles {
    Table,
    ProfileId,
    UserId,
    Bio,
    Picture,
}
