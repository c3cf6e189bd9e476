//! Inputs for ad composition, one row per ad to generate
use sea_orm::{ActiveValue::Set, QueryOrder, entity::prelude::*};

use crate::batch::ImageRecord;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ad_sources")]
/// Where to find the pieces of one ad
pub struct Model {
    #[sea_orm(primary_key)]
    /// db id
    pub id: i32,
    /// original screenshot, fed to the classifiers
    pub url: String,
    /// background-removed overlay, either a URL or `stored:<filename>`
    pub extracted_url: String,
    /// Play Store listing handed to the phrase service
    pub google_play_url: String,
    /// App Store listing handed to the phrase service
    pub apple_app_url: String,
    /// when the row was written
    pub created_at: DateTime,
}

/// relations for ad sources
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ImageRecord {
    fn from(model: Model) -> Self {
        ImageRecord {
            url: model.url,
            extracted_url: model.extracted_url,
            google_play_url: model.google_play_url,
            apple_app_url: model.apple_app_url,
        }
    }
}

/// Stores a record, returning the new row
pub async fn insert<C: ConnectionTrait>(db: &C, record: &ImageRecord) -> Result<Model, DbErr> {
    ActiveModel {
        url: Set(record.url.clone()),
        extracted_url: Set(record.extracted_url.clone()),
        google_play_url: Set(record.google_play_url.clone()),
        apple_app_url: Set(record.apple_app_url.clone()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Every record, in insertion order
pub async fn all<C: ConnectionTrait>(db: &C) -> Result<Vec<ImageRecord>, DbErr> {
    Ok(Entity::find()
        .order_by_asc(Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(ImageRecord::from)
        .collect())
}
