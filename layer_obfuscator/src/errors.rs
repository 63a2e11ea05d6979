use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error("{0}")]
    Layer(#[from] crate::pipeline::LayerError),
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error("other error: {0}")]
    Other(String),
}
