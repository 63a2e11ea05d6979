use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use config as config_rs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::{resolve_sequence, LayerKind};
use crate::transforms::{shift_chars, STANDARD_ALPHABET};

pub const DEFAULT_PADDING_MARKER: &str = "XYZ_";
pub const DEFAULT_PADDING_INTERVAL: usize = 10;
pub const DEFAULT_CHAR_SHIFT_OFFSET: u32 = 3;
pub const DEFAULT_CHAR_SUB_KEY: u32 = 1;
pub const DEFAULT_VARIANT_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Prefix for environment overrides, e.g. `LAYERS_PADDING_MARKER`.
pub const ENV_PREFIX: &str = "LAYERS";

const DEFAULT_DIGIT_MAP: [(char, char); 10] = [
    ('0', '!'),
    ('1', '@'),
    ('2', '#'),
    ('3', '$'),
    ('4', '%'),
    ('5', '^'),
    ('6', '&'),
    ('7', '*'),
    ('8', '('),
    ('9', ')'),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown layer defined: {0}")]
    UnknownLayer(String),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(#[from] config_rs::ConfigError),
}

/// Constants shared by every layer of the pipeline.
///
/// Built once (defaults, file, environment) and then only ever borrowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObfuscationConfig {
    /// Layer identifiers in encoding order.
    pub sequence: Vec<String>,
    pub padding_marker: String,
    /// Characters between two padding markers.
    pub padding_interval: usize,
    pub char_shift_offset: u32,
    pub char_sub_key: u32,
    /// Digit to symbol substitution table.
    pub digit_map: BTreeMap<char, char>,
    /// Replacement for the 64 standard Base64 characters, position for position.
    pub variant_alphabet: String,
}

impl Default for ObfuscationConfig {
    fn default() -> Self {
        Self {
            sequence: LayerKind::CANONICAL_ORDER
                .iter()
                .map(|layer| layer.name().to_string())
                .collect(),
            padding_marker: DEFAULT_PADDING_MARKER.to_string(),
            padding_interval: DEFAULT_PADDING_INTERVAL,
            char_shift_offset: DEFAULT_CHAR_SHIFT_OFFSET,
            char_sub_key: DEFAULT_CHAR_SUB_KEY,
            digit_map: DEFAULT_DIGIT_MAP.into_iter().collect(),
            variant_alphabet: DEFAULT_VARIANT_ALPHABET.to_string(),
        }
    }
}

impl ObfuscationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.padding_marker.is_empty() {
            return Err(ConfigError::Invalid("padding_marker must not be empty".into()));
        }
        if self.padding_interval == 0 {
            return Err(ConfigError::Invalid("padding_interval must be at least 1".into()));
        }
        self.validate_digit_map()?;
        self.validate_alphabet()?;
        self.validate_marker()?;
        self.validate_shift_image()?;
        resolve_sequence(&self.sequence)?;
        Ok(())
    }

    /// The marker is removed textually, so it must never occur inside Base64
    /// output, and it must keep the padded length even for the pair swap.
    fn validate_marker(&self) -> Result<(), ConfigError> {
        let marker = &self.padding_marker;
        if marker.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid(
                "padding_marker must not contain whitespace".into(),
            ));
        }
        if marker.chars().all(|c| c == '=' || STANDARD_ALPHABET.contains(c)) {
            return Err(ConfigError::Invalid(format!(
                "padding_marker {marker:?} needs a character outside the Base64 alphabet"
            )));
        }
        if marker.chars().count() % 2 != 0 {
            return Err(ConfigError::Invalid(format!(
                "padding_marker {marker:?} must have an even number of characters"
            )));
        }
        Ok(())
    }

    /// Base64 characters, `=` and the marker are all the shift layers ever
    /// see. Their shifted images must stay valid and must not land on a
    /// digit_map symbol, or digit decoding would rewrite them.
    fn validate_shift_image(&self) -> Result<(), ConfigError> {
        let source: String = STANDARD_ALPHABET
            .chars()
            .chain(std::iter::once('='))
            .chain(self.padding_marker.chars())
            .collect();
        let image = shift_chars(&source, i64::from(self.char_shift_offset))
            .and_then(|shifted| shift_chars(&shifted, -i64::from(self.char_sub_key)))
            .map_err(|e| ConfigError::Invalid(format!("char_shift_offset/char_sub_key: {e}")))?;

        let symbols: HashSet<char> = self.digit_map.values().copied().collect();
        for (original, shifted) in source.chars().zip(image.chars()) {
            if symbols.contains(&shifted) {
                return Err(ConfigError::Invalid(format!(
                    "{original:?} shifts onto digit_map symbol {shifted:?} and would not decode"
                )));
            }
        }
        Ok(())
    }

    fn validate_digit_map(&self) -> Result<(), ConfigError> {
        let expected: Vec<char> = ('0'..='9').collect();
        let keys: Vec<char> = self.digit_map.keys().copied().collect();
        if keys != expected {
            return Err(ConfigError::Invalid(
                "digit_map must map exactly the digits 0-9".into(),
            ));
        }

        let mut seen = HashSet::new();
        for (digit, symbol) in &self.digit_map {
            if symbol.is_ascii_digit() {
                return Err(ConfigError::Invalid(format!(
                    "digit_map symbol for '{digit}' must not be a digit, got '{symbol}'"
                )));
            }
            if !seen.insert(*symbol) {
                return Err(ConfigError::Invalid(format!(
                    "digit_map symbol '{symbol}' is used more than once"
                )));
            }
        }
        Ok(())
    }

    fn validate_alphabet(&self) -> Result<(), ConfigError> {
        let chars: Vec<char> = self.variant_alphabet.chars().collect();
        if chars.len() != 64 {
            return Err(ConfigError::Invalid(format!(
                "variant_alphabet must have 64 characters, got {}",
                chars.len()
            )));
        }
        if chars.contains(&'=') {
            return Err(ConfigError::Invalid(
                "variant_alphabet must not contain the padding character '='".into(),
            ));
        }
        let distinct: HashSet<char> = chars.iter().copied().collect();
        if distinct.len() != chars.len() {
            return Err(ConfigError::Invalid(
                "variant_alphabet characters must be distinct".into(),
            ));
        }
        Ok(())
    }

    /// Inverse of `digit_map`, symbol to digit.
    pub fn symbol_map(&self) -> BTreeMap<char, char> {
        self.digit_map
            .iter()
            .map(|(digit, symbol)| (*symbol, *digit))
            .collect()
    }
}

/// Build the effective configuration.
///
/// Layers, lowest precedence first: built-in defaults, the optional file
/// (format picked from its extension), then `LAYERS_*` environment variables.
pub fn load_config(path: Option<&Path>) -> Result<ObfuscationConfig, ConfigError> {
    let mut builder = config_rs::Config::builder();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("config file not found: {}", path.display()),
            )));
        }
        builder = builder.add_source(config_rs::File::from(path).required(true));
    }

    builder = builder.add_source(
        config_rs::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("sequence"),
    );

    let cfg: ObfuscationConfig = builder.build()?.try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
}

/// Parse a configuration from a JSON document.
pub fn config_from_json(content: &str) -> Result<ObfuscationConfig, ConfigError> {
    let cfg: ObfuscationConfig = serde_json::from_str(content)?;
    cfg.validate()?;
    Ok(cfg)
}
