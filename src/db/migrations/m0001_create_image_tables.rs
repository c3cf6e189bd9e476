use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Screenshots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Screenshots::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Screenshots::Filename).string().not_null())
                    .col(ColumnDef::new(Screenshots::Data).blob().not_null())
                    .col(
                        ColumnDef::new(Screenshots::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExtractedImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExtractedImages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExtractedImages::Filename)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExtractedImages::Data).blob().not_null())
                    .col(
                        ColumnDef::new(ExtractedImages::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExtractedImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Screenshots::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Screenshots {
    Table,
    Id,
    Filename,
    Data,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ExtractedImages {
    Table,
    Id,
    Filename,
    Data,
    CreatedAt,
}
