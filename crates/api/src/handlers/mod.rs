pub mod auth;
pub mod documents;
pub mod ingest;
pub mod logs;
pub mod settings;
