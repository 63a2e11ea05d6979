use std::fmt;
use std::str::FromStr;

use crate::config::{ConfigError, ObfuscationConfig};
use crate::transforms::{self, TransformError};

/// One reversible step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    CustomB64,
    AddPadding,
    ReverseWords,
    HexSwap,
    CharOffset,
    CharSubtract,
    DigitReplace,
    BaseNConvert,
    Base64Variant,
}

impl LayerKind {
    /// Default encoding order.
    pub const CANONICAL_ORDER: [LayerKind; 9] = [
        LayerKind::CustomB64,
        LayerKind::AddPadding,
        LayerKind::ReverseWords,
        LayerKind::HexSwap,
        LayerKind::CharOffset,
        LayerKind::CharSubtract,
        LayerKind::DigitReplace,
        LayerKind::BaseNConvert,
        LayerKind::Base64Variant,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            LayerKind::CustomB64 => "CUSTOM_B64",
            LayerKind::AddPadding => "ADD_PADDING",
            LayerKind::ReverseWords => "REVERSE_WORDS",
            LayerKind::HexSwap => "HEX_SWAP",
            LayerKind::CharOffset => "CHAR_OFFSET",
            LayerKind::CharSubtract => "CHAR_SUBTRACT",
            LayerKind::DigitReplace => "DIGIT_REPLACE",
            LayerKind::BaseNConvert => "BASE_N_CONVERT",
            LayerKind::Base64Variant => "BASE64_VARIANT",
        }
    }

    pub fn encode(self, input: &str, cfg: &ObfuscationConfig) -> Result<String, TransformError> {
        match self {
            LayerKind::CustomB64 => Ok(transforms::utf8_to_base64(input)),
            LayerKind::AddPadding => Ok(transforms::add_padding(
                input,
                &cfg.padding_marker,
                cfg.padding_interval,
            )),
            LayerKind::ReverseWords => Ok(transforms::reverse_words(input)),
            LayerKind::HexSwap => Ok(transforms::hex_swap(input)),
            LayerKind::CharOffset => {
                transforms::shift_chars(input, i64::from(cfg.char_shift_offset))
            }
            LayerKind::CharSubtract => transforms::shift_chars(input, -i64::from(cfg.char_sub_key)),
            LayerKind::DigitReplace => Ok(transforms::substitute_chars(input, &cfg.digit_map)),
            LayerKind::BaseNConvert => transforms::digits_to_hex_tags(input),
            LayerKind::Base64Variant => Ok(transforms::base64_variant(input, &cfg.variant_alphabet)),
        }
    }

    pub fn decode(self, input: &str, cfg: &ObfuscationConfig) -> Result<String, TransformError> {
        match self {
            LayerKind::CustomB64 => transforms::base64_to_utf8(input),
            LayerKind::AddPadding => Ok(transforms::remove_padding(input, &cfg.padding_marker)),
            // same operation in both directions
            LayerKind::ReverseWords => Ok(transforms::reverse_words(input)),
            LayerKind::HexSwap => Ok(transforms::hex_swap(input)),
            LayerKind::CharOffset => {
                transforms::shift_chars(input, -i64::from(cfg.char_shift_offset))
            }
            LayerKind::CharSubtract => transforms::shift_chars(input, i64::from(cfg.char_sub_key)),
            LayerKind::DigitReplace => Ok(transforms::substitute_chars(input, &cfg.symbol_map())),
            LayerKind::BaseNConvert => transforms::hex_tags_to_digits(input),
            LayerKind::Base64Variant => transforms::unbase64_variant(input, &cfg.variant_alphabet),
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LayerKind::CANONICAL_ORDER
            .into_iter()
            .find(|layer| layer.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownLayer(s.to_string()))
    }
}

/// Resolve layer identifiers, failing on the first unknown one.
pub fn resolve_sequence<S: AsRef<str>>(names: &[S]) -> Result<Vec<LayerKind>, ConfigError> {
    names.iter().map(|name| name.as_ref().parse()).collect()
}
