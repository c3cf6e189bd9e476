use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AdSources::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdSources::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AdSources::Url).string().not_null())
                    .col(ColumnDef::new(AdSources::ExtractedUrl).string().not_null())
                    .col(ColumnDef::new(AdSources::GooglePlayUrl).string().not_null())
                    .col(ColumnDef::new(AdSources::AppleAppUrl).string().not_null())
                    .col(
                        ColumnDef::new(AdSources::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdSources::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AdSources {
    Table,
    Id,
    Url,
    ExtractedUrl,
    GooglePlayUrl,
    AppleAppUrl,
    CreatedAt,
}
