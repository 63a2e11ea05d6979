//! The individual layers. Every function here is pure; encode/decode pairing
//! lives in [`crate::registry::LayerKind`].

use std::collections::{BTreeMap, HashMap};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

pub const STANDARD_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

static HEX_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[B16:([0-9A-F]+)\]").unwrap());

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("invalid base64 input: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("decoded bytes are not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("character {ch:?} shifted by {delta} is outside the valid character range")]
    CodePointOutOfRange { ch: char, delta: i64 },
    #[error("number too large to convert: {0}")]
    NumberTooLarge(String),
}

pub fn utf8_to_base64(input: &str) -> String {
    STANDARD.encode(input.as_bytes())
}

pub fn base64_to_utf8(input: &str) -> Result<String, TransformError> {
    let bytes = STANDARD.decode(input)?;
    Ok(String::from_utf8(bytes)?)
}

/// Append `marker` after every `interval` characters, including after a
/// shorter final chunk.
pub fn add_padding(input: &str, marker: &str, interval: usize) -> String {
    let chars: Vec<char> = input.chars().collect();
    let chunks = chars.chunks(interval.max(1));
    let mut out = String::with_capacity(input.len() + chunks.len() * marker.len());
    for chunk in chunks {
        out.extend(chunk);
        out.push_str(marker);
    }
    out
}

/// Textual removal: marker-like content that was never padding goes too.
pub fn remove_padding(input: &str, marker: &str) -> String {
    input.replace(marker, "")
}

/// Reverse whitespace-separated tokens, rejoining with single spaces.
///
/// Leading or trailing whitespace produces an empty token at that end, so
/// `" a b"` becomes `"b a "`.
pub fn reverse_words(input: &str) -> String {
    let mut words: Vec<&str> = WHITESPACE_RUN.split(input).collect();
    words.reverse();
    words.join(" ")
}

/// Swap characters 0<->1, 2<->3, ...
///
/// Odd input is padded with a space before swapping and the last output
/// character is dropped afterwards, so `"abc"` becomes `"ba "`. Only
/// even-length input is its own inverse.
pub fn hex_swap(input: &str) -> String {
    let mut chars: Vec<char> = input.chars().collect();
    let odd = chars.len() % 2 != 0;
    if odd {
        chars.push(' ');
    }
    for pair in chars.chunks_exact_mut(2) {
        pair.swap(0, 1);
    }
    if odd {
        chars.pop();
    }
    chars.into_iter().collect()
}

pub fn shift_chars(input: &str, delta: i64) -> Result<String, TransformError> {
    input
        .chars()
        .map(|ch| {
            let shifted = i64::from(u32::from(ch)) + delta;
            u32::try_from(shifted)
                .ok()
                .and_then(char::from_u32)
                .ok_or(TransformError::CodePointOutOfRange { ch, delta })
        })
        .collect()
}

/// Replace every character found in `map`; everything else is copied.
pub fn substitute_chars(input: &str, map: &BTreeMap<char, char>) -> String {
    input
        .chars()
        .map(|ch| map.get(&ch).copied().unwrap_or(ch))
        .collect()
}

/// `"Room 255"` -> `"Room [B16:FF]"`. Leading zeros do not survive.
pub fn digits_to_hex_tags(input: &str) -> Result<String, TransformError> {
    try_replace_all(&DIGIT_RUN, input, |caps| {
        let run = &caps[0];
        let value: u128 = run
            .parse()
            .map_err(|_| TransformError::NumberTooLarge(run.to_string()))?;
        Ok(format!("[B16:{value:X}]"))
    })
}

pub fn hex_tags_to_digits(input: &str) -> Result<String, TransformError> {
    try_replace_all(&HEX_TAG, input, |caps| {
        let hex = &caps[1];
        let value = u128::from_str_radix(hex, 16)
            .map_err(|_| TransformError::NumberTooLarge(hex.to_string()))?;
        Ok(value.to_string())
    })
}

/// Standard Base64, then each standard-alphabet character is replaced by the
/// character at the same position in `alphabet`. `=` padding passes through.
pub fn base64_variant(input: &str, alphabet: &str) -> String {
    remap(&utf8_to_base64(input), STANDARD_ALPHABET, alphabet)
}

pub fn unbase64_variant(input: &str, alphabet: &str) -> Result<String, TransformError> {
    base64_to_utf8(&remap(input, alphabet, STANDARD_ALPHABET))
}

fn remap(input: &str, from: &str, to: &str) -> String {
    let table: HashMap<char, char> = from.chars().zip(to.chars()).collect();
    input
        .chars()
        .map(|ch| table.get(&ch).copied().unwrap_or(ch))
        .collect()
}

fn try_replace_all<F>(re: &Regex, input: &str, mut replace: F) -> Result<String, TransformError>
where
    F: FnMut(&Captures<'_>) -> Result<String, TransformError>,
{
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    for caps in re.captures_iter(input) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&input[last..whole.start()]);
        out.push_str(&replace(&caps)?);
        last = whole.end();
    }
    out.push_str(&input[last..]);
    Ok(out)
}
