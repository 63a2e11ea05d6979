use std::sync::Arc;

use layer_obfuscator::config::{ConfigError, ObfuscationConfig};
use layer_obfuscator::pipeline::{run_with_sequence, Direction, LayerError, Pipeline};
use layer_obfuscator::registry::LayerKind;

#[test]
fn hello_round_trips_through_all_layers() {
    let pipeline = Pipeline::default();
    let encoded = pipeline.encode("Hello").unwrap();
    assert_eq!(encoded, "SVV1WElkPzpbWmFc");
    assert_eq!(pipeline.decode(&encoded).unwrap(), "Hello");
}

#[test]
fn default_pipeline_matches_validated_defaults() {
    let built = Pipeline::new(ObfuscationConfig::default()).unwrap();
    assert_eq!(built.layers(), Pipeline::default().layers());
    assert_eq!(built.layers(), &LayerKind::CANONICAL_ORDER);
}

#[test]
fn unicode_text_round_trips() {
    let pipeline = Pipeline::default();
    for text in ["héllo wörld", "日本語のテキスト 123", "emoji 🚀🔥 0042", "  padded\tand\nmulti line  "] {
        let encoded = pipeline.encode(text).unwrap();
        assert_ne!(encoded, text);
        assert_eq!(pipeline.decode(&encoded).unwrap(), text, "input: {text:?}");
    }
}

#[test]
fn run_is_deterministic() {
    let pipeline = Pipeline::default();
    let first = pipeline.run("Room 255 now", Direction::Encode).unwrap();
    for _ in 0..5 {
        assert_eq!(pipeline.run("Room 255 now", Direction::Encode).unwrap(), first);
    }
    assert_eq!(first, "b1d4O1Vke0NWUFtaYVxpV29kXjtbWmFc");
}

#[test]
fn empty_input_is_rejected() {
    let pipeline = Pipeline::default();
    for text in ["", "   ", "\n\t"] {
        for direction in [Direction::Encode, Direction::Decode] {
            let err = pipeline.run(text, direction).unwrap_err();
            assert!(matches!(err, LayerError::EmptyInput));
            assert_eq!(err.to_string(), "Input cannot be empty.");
        }
    }
}

#[test]
fn malformed_decode_input_names_failing_layer() {
    let pipeline = Pipeline::default();
    match pipeline.decode("!!!!") {
        Err(LayerError::Step { layer, .. }) => assert_eq!(layer, LayerKind::Base64Variant),
        other => panic!("expected step failure, got {other:?}"),
    }
}

#[test]
fn unknown_layer_fails_before_running() {
    let cfg = ObfuscationConfig::default();
    let err = run_with_sequence("Hello", Direction::Encode, &["CUSTOM_B64", "NOPE"], &cfg).unwrap_err();
    match err {
        LayerError::Config(ConfigError::UnknownLayer(name)) => assert_eq!(name, "NOPE"),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn pipeline_new_rejects_unknown_layer() {
    let cfg = ObfuscationConfig {
        sequence: vec!["CUSTOM_B64".into(), "SCRAMBLE".into()],
        ..ObfuscationConfig::default()
    };
    assert!(matches!(Pipeline::new(cfg), Err(ConfigError::UnknownLayer(_))));
}

#[test]
fn single_numeric_layer() {
    let cfg = ObfuscationConfig::default();
    let tagged = run_with_sequence("Room 255 now", Direction::Encode, &["BASE_N_CONVERT"], &cfg).unwrap();
    assert_eq!(tagged, "Room [B16:FF] now");
    let restored = run_with_sequence(&tagged, Direction::Decode, &["BASE_N_CONVERT"], &cfg).unwrap();
    assert_eq!(restored, "Room 255 now");
}

#[test]
fn single_swap_layer_is_self_inverse() {
    let cfg = ObfuscationConfig::default();
    let swapped = run_with_sequence("abcd", Direction::Encode, &["HEX_SWAP"], &cfg).unwrap();
    assert_eq!(swapped, "badc");
    let again = run_with_sequence(&swapped, Direction::Encode, &["HEX_SWAP"], &cfg).unwrap();
    assert_eq!(again, "abcd");
}

#[test]
fn single_swap_layer_drops_last_char_of_odd_input() {
    let cfg = ObfuscationConfig::default();
    let swapped = run_with_sequence("abcde", Direction::Encode, &["HEX_SWAP"], &cfg).unwrap();
    assert_eq!(swapped, "badc ");
    let again = run_with_sequence(&swapped, Direction::Decode, &["HEX_SWAP"], &cfg).unwrap();
    assert_eq!(again, "abcd ");
}

#[test]
fn decode_applies_layers_in_reverse() {
    let cfg = ObfuscationConfig::default();
    let sequence = ["ADD_PADDING", "CHAR_OFFSET"];
    let encoded = run_with_sequence("abc", Direction::Encode, &sequence, &cfg).unwrap();
    // padding first, then every char (marker included) shifted by 3
    assert_eq!(encoded, "def[\\]b");
    assert_eq!(run_with_sequence(&encoded, Direction::Decode, &sequence, &cfg).unwrap(), "abc");
}

#[test]
fn padding_marker_in_content_is_lost() {
    let cfg = ObfuscationConfig::default();
    let encoded = run_with_sequence("aXYZ_b", Direction::Encode, &["ADD_PADDING"], &cfg).unwrap();
    let decoded = run_with_sequence(&encoded, Direction::Decode, &["ADD_PADDING"], &cfg).unwrap();
    assert_eq!(decoded, "ab");
}

#[test]
fn custom_constants_round_trip() {
    let mut digit_map = ObfuscationConfig::default().digit_map;
    digit_map.insert('0', '§');
    let cfg = ObfuscationConfig {
        padding_marker: "~|".into(),
        padding_interval: 3,
        char_shift_offset: 5,
        char_sub_key: 3,
        digit_map,
        variant_alphabet: "zyxwvutsrqponmlkjihgfedcbaZYXWVUTSRQPONMLKJIHGFEDCBA9876543210._".into(),
        ..ObfuscationConfig::default()
    };
    let pipeline = Pipeline::new(cfg).unwrap();
    let encoded = pipeline.encode("Order 1007 shipped").unwrap();
    assert_ne!(encoded, Pipeline::default().encode("Order 1007 shipped").unwrap());
    assert_eq!(pipeline.decode(&encoded).unwrap(), "Order 1007 shipped");
}

#[test]
fn pipeline_is_shareable_across_threads() {
    let pipeline = Arc::new(Pipeline::default());
    let expected = pipeline.encode("shared input").unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let pipeline = Arc::clone(&pipeline);
            let expected = expected.clone();
            scope.spawn(move || {
                let encoded = pipeline.encode("shared input").unwrap();
                assert_eq!(encoded, expected);
                assert_eq!(pipeline.decode(&encoded).unwrap(), "shared input");
            });
        }
    });
}

#[test]
fn direction_parses_case_insensitively() {
    assert_eq!("Encode".parse::<Direction>().unwrap(), Direction::Encode);
    assert_eq!("decode".parse::<Direction>().unwrap(), Direction::Decode);
    assert!("reverse".parse::<Direction>().is_err());
}
