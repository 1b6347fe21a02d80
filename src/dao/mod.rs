/// Storage entities shared by every backend.
pub mod models;
/// Backend-agnostic storage errors.
pub mod storage;
/// Story and content persistence trait with its backends.
pub mod story_store;
