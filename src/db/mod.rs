//! Storage for scraped images and ad sources
pub mod entities;
pub mod migrations;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, error, info};

use crate::batch::ImageRecord;
use crate::error::AdforgeError;

/// Connects to the sqlite database at `path`, creating it if needed.
pub async fn connect_db(path: &str) -> Result<DatabaseConnection, DbErr> {
    let url = format!("sqlite://{}?mode=rwc", path);
    Database::connect(url).await
}

/// One open connection, migrated and ready to use.
#[derive(Debug)]
pub struct Storage {
    db: DatabaseConnection,
}

impl Storage {
    /// Opens the database file at `path` and runs migrations.
    pub async fn open(path: &str) -> Result<Self, AdforgeError> {
        info!("Opening database {}", path);
        let db = connect_db(path).await?;
        Self::migrated(db).await
    }

    /// Opens a private in-memory database, mostly useful for tests.
    pub async fn in_memory() -> Result<Self, AdforgeError> {
        let mut options = ConnectOptions::new("sqlite::memory:");
        // every pooled connection would otherwise see its own empty database
        options.max_connections(1).min_connections(1);
        let db = Database::connect(options).await?;
        Self::migrated(db).await
    }

    async fn migrated(db: DatabaseConnection) -> Result<Self, AdforgeError> {
        migrations::Migrator::up(&db, None).await?;
        Ok(Self { db })
    }

    /// Closes the connection.
    pub async fn close(self) -> Result<(), AdforgeError> {
        debug!("Closing database connection");
        self.db.close().await?;
        Ok(())
    }

    /// Stores a scraped screenshot.
    pub async fn insert_screenshot(&self, filename: &str, data: Vec<u8>) -> Result<(), AdforgeError> {
        entities::screenshots::insert(&self.db, filename, data).await?;
        info!("Stored {} in the database", filename);
        Ok(())
    }

    /// All stored screenshots, oldest first.
    pub async fn screenshots(&self) -> Result<Vec<entities::screenshots::Model>, AdforgeError> {
        Ok(entities::screenshots::all(&self.db).await?)
    }

    /// Stores a background-removed image.
    pub async fn insert_extracted_image(
        &self,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<(), AdforgeError> {
        entities::extracted_images::insert(&self.db, filename, data).await?;
        info!("Image {} stored successfully", filename);
        Ok(())
    }

    /// Bytes of the extracted image called `filename`.
    pub async fn extracted_image(&self, filename: &str) -> Result<Vec<u8>, AdforgeError> {
        entities::extracted_images::find_by_filename(&self.db, filename)
            .await?
            .map(|model| model.data)
            .ok_or_else(|| AdforgeError::MissingImage(filename.to_string()))
    }

    /// Adds an ad source record.
    pub async fn insert_ad_source(&self, record: &ImageRecord) -> Result<i32, AdforgeError> {
        Ok(entities::ad_sources::insert(&self.db, record).await?.id)
    }

    /// Loads every ad source record; an empty table is an error.
    pub async fn ad_sources(&self) -> Result<Vec<ImageRecord>, AdforgeError> {
        let records = entities::ad_sources::all(&self.db).await?;
        if records.is_empty() {
            return Err(AdforgeError::NoRecords);
        }
        info!("Fetched {} image data entries", records.len());
        Ok(records)
    }
}

/// Opens the database at `path`, hands it to `work`, then closes it whether
/// or not `work` succeeded.
pub async fn with_storage<T, F>(path: &str, work: F) -> Result<T, AdforgeError>
where
    F: AsyncFnOnce(&Storage) -> Result<T, AdforgeError>,
{
    let storage = Storage::open(path).await?;
    let result = work(&storage).await;
    if let Err(err) = storage.close().await {
        error!("Failed to close database connection: {}", err);
    }
    result
}
