#![forbid(unsafe_code)]

pub mod factory;
pub mod live;
pub mod memory;
pub mod repository;
pub mod sqlite;

pub use factory::{BackendSettings, DataSourceMode, DataSourceRegistry};
pub use repository::{
    DEFAULT_HISTORY_LIMIT, DataSources, MinigameDataSource, StorageError, UserDataSource,
};
