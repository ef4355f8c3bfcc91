//! Server configuration from flags, environment and `.env`.

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use todo_core::{
    mongo::{DEFAULT_COLLECTION, DEFAULT_DATABASE},
    MemoryRepository, MongoRepository, SharedRepository,
};

/// REST API for to-do items
#[derive(Debug, Clone, Parser)]
#[command(name = "todo-server", version, about, long_about = None)]
pub struct Config {
    /// Interface to bind
    #[arg(long, env = "TODO_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Storage backend
    #[arg(long, env = "TODO_STORAGE", value_enum, default_value_t = StorageKind::Mongo)]
    pub storage: StorageKind,

    /// MongoDB connection string (required for `--storage mongo`)
    #[arg(long, env = "TODO_MONGO_URI", hide_env_values = true)]
    pub mongo_uri: Option<String>,

    /// MongoDB database name
    #[arg(long, env = "TODO_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// MongoDB collection name
    #[arg(long, env = "TODO_COLLECTION", default_value = DEFAULT_COLLECTION)]
    pub collection: String,

    /// Base URL used in `Location` headers, e.g. `https://todo.example.com`.
    /// Defaults to `http://<Host header>`.
    #[arg(long, env = "TODO_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, env = "TODO_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageKind {
    Mongo,
    Memory,
}

impl Config {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build the configured backend. MongoDB is pinged before this returns.
    pub async fn build_repository(&self) -> anyhow::Result<SharedRepository> {
        match self.storage {
            StorageKind::Memory => Ok(Arc::new(MemoryRepository::new())),
            StorageKind::Mongo => {
                let uri = match self.mongo_uri.as_deref().map(str::trim) {
                    Some(uri) if !uri.is_empty() => uri,
                    _ => bail!("--mongo-uri (TODO_MONGO_URI) is required for --storage mongo"),
                };
                let repo = MongoRepository::connect(uri, &self.database, &self.collection)
                    .await
                    .with_context(|| format!("connecting to MongoDB database `{}`", self.database))?;
                Ok(Arc::new(repo))
            }
        }
    }
}
