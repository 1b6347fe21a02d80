use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures raised by the MongoDB backend.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to save story `{id}`")]
    SaveStory {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load story `{id}`")]
    LoadStory {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete story `{id}`")]
    DeleteStory {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to list stories of player `{player_id}`")]
    ListStories {
        player_id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to save {kind} `{id}`")]
    SaveContent {
        kind: &'static str,
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to list {kind} for theme `{theme}`")]
    ListContent {
        kind: &'static str,
        theme: String,
        #[source]
        source: MongoError,
    },
    #[error("stored {kind} document has an invalid id")]
    CorruptDocument {
        kind: &'static str,
        #[source]
        source: uuid::Error,
    },
}
