mod settings;

pub use settings::{
    DatabaseConfig, OtelConfig, ServerConfig, Settings, StationStoreConfig, StreamingConfig,
};
