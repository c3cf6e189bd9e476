//! Raw screenshots scraped from store listings
use sea_orm::{ActiveValue::Set, QueryOrder, entity::prelude::*};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "screenshots")]
/// A downloaded screenshot
pub struct Model {
    #[sea_orm(primary_key)]
    /// db id
    pub id: i32,
    /// name the image was stored under
    pub filename: String,
    /// encoded image bytes, as downloaded
    pub data: Vec<u8>,
    /// when the row was written
    pub created_at: DateTime,
}

/// relations for screenshots
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Stores a screenshot, returning the new row
pub async fn insert<C: ConnectionTrait>(
    db: &C,
    filename: &str,
    data: Vec<u8>,
) -> Result<Model, DbErr> {
    ActiveModel {
        filename: Set(filename.to_string()),
        data: Set(data),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Every stored screenshot, oldest first
pub async fn all<C: ConnectionTrait>(db: &C) -> Result<Vec<Model>, DbErr> {
    Entity::find().order_by_asc(Column::Id).all(db).await
}
