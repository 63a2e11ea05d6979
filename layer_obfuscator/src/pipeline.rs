use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::config::{ConfigError, ObfuscationConfig};
use crate::registry::{resolve_sequence, LayerKind};
use crate::transforms::TransformError;

#[derive(Debug, Error)]
pub enum LayerError {
    #[error("Input cannot be empty.")]
    EmptyInput,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("layer {layer} failed: {source}")]
    Step {
        layer: LayerKind,
        #[source]
        source: TransformError,
    },
    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<LayerError>,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Encode,
    Decode,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Encode => "encode",
            Direction::Decode => "decode",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "encode" => Ok(Direction::Encode),
            "decode" => Ok(Direction::Decode),
            other => Err(format!("unknown direction '{other}', expected encode or decode")),
        }
    }
}

/// Validated configuration plus its resolved layer sequence.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ObfuscationConfig,
    layers: Vec<LayerKind>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            config: ObfuscationConfig::default(),
            layers: LayerKind::CANONICAL_ORDER.to_vec(),
        }
    }
}

impl Pipeline {
    pub fn new(config: ObfuscationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let layers = resolve_sequence(&config.sequence)?;
        Ok(Self { config, layers })
    }

    pub fn layers(&self) -> &[LayerKind] {
        &self.layers
    }

    pub fn config(&self) -> &ObfuscationConfig {
        &self.config
    }

    pub fn encode(&self, text: &str) -> Result<String, LayerError> {
        self.run(text, Direction::Encode)
    }

    pub fn decode(&self, text: &str) -> Result<String, LayerError> {
        self.run(text, Direction::Decode)
    }

    /// Encode front to back, or decode back to front with each layer's inverse.
    /// The first failing layer aborts the run.
    pub fn run(&self, text: &str, direction: Direction) -> Result<String, LayerError> {
        if text.trim().is_empty() {
            return Err(LayerError::EmptyInput);
        }

        let steps: Vec<LayerKind> = match direction {
            Direction::Encode => self.layers.clone(),
            Direction::Decode => self.layers.iter().rev().copied().collect(),
        };

        let mut current = text.to_string();
        for layer in steps {
            let applied = match direction {
                Direction::Encode => layer.encode(&current, &self.config),
                Direction::Decode => layer.decode(&current, &self.config),
            };
            current = applied.map_err(|source| {
                warn!(%layer, %direction, error = %source, "layer failed");
                LayerError::Step { layer, source }
            })?;
            debug!(%layer, %direction, len = current.len(), "layer applied");
        }
        Ok(current)
    }

    /// Run every line of `reader` through the pipeline on its own.
    ///
    /// Blank lines are written back empty. Returns the number of lines read.
    pub async fn run_stream<R, W>(
        &self,
        reader: R,
        mut writer: W,
        direction: Direction,
    ) -> Result<usize, LayerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut line_no = 0;
        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            if line.trim().is_empty() {
                writer.write_all(b"\n").await?;
                continue;
            }
            let out = self.run(&line, direction).map_err(|source| LayerError::Line {
                line: line_no,
                source: Box::new(source),
            })?;
            writer.write_all(out.as_bytes()).await?;
            writer.write_all(b"\n").await?;
        }
        writer.flush().await?;
        Ok(line_no)
    }
}

/// Resolve `sequence` and run `text` through it with `config`'s constants.
///
/// An unknown layer name fails before any layer runs.
pub fn run_with_sequence<S: AsRef<str>>(
    text: &str,
    direction: Direction,
    sequence: &[S],
    config: &ObfuscationConfig,
) -> Result<String, LayerError> {
    let config = ObfuscationConfig {
        sequence: sequence.iter().map(|s| s.as_ref().to_string()).collect(),
        ..config.clone()
    };
    Pipeline::new(config)?.run(text, direction)
}
