pub mod config;
pub mod registry;
pub mod transforms;
pub mod pipeline;
pub mod errors;
pub mod metrics;
pub mod logger;

pub use config::{load_config, ConfigError, ObfuscationConfig};
pub use pipeline::{run_with_sequence, Direction, LayerError, Pipeline};
pub use registry::LayerKind;
pub use transforms::TransformError;
