//! Screenshots with their background removed
use sea_orm::{ActiveValue::Set, entity::prelude::*};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "extracted_images")]
/// A background-removed image
pub struct Model {
    #[sea_orm(primary_key)]
    /// db id
    pub id: i32,
    /// `extracted_` followed by the source screenshot's filename
    pub filename: String,
    /// PNG bytes returned by the background removal service
    pub data: Vec<u8>,
    /// when the row was written
    pub created_at: DateTime,
}

/// relations for extracted images
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Stores an extracted image, returning the new row
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

/// Looks up an extracted image by filename
pub async fn find_by_filename<C: ConnectionTrait>(
    db: &C,
    filename: &str,
) -> Result<Option<Model>, DbErr> {
    Entity::find()
        .filter(Column::Filename.eq(filename))
        .one(db)
        .await
}
