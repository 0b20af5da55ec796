use polyserial::{Codec, CodecLimits, ConfigError, Registry, SerialError, SerialisableList};

#[test]
fn limits_survive_save_and_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("limits.toml");
    let limits = CodecLimits {
        max_text_bytes: 4096,
        max_decompressed_bytes: 8192,
        max_nesting_depth: 4,
    };
    limits.save(&path).expect("save");
    assert_eq!(CodecLimits::load(&path).expect("load"), limits);
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = CodecLimits::load(&dir.path().join("absent.toml")).expect_err("missing");
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[test]
fn loaded_limits_bound_the_codec() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("limits.toml");
    std::fs::write(&path, "max_text_bytes = 12\n").expect("write");
    let limits = CodecLimits::load(&path).expect("load");
    assert_eq!(limits.max_nesting_depth, CodecLimits::default().max_nesting_depth);

    let registry = Registry::builtin();
    let codec = Codec::new(&registry).with_limits(limits);
    assert!(codec.decode_as::<SerialisableList>("[26,1,[]]").is_ok());
    let err = codec
        .create_from_string("[26,1,[[26,1,[]]]]")
        .expect_err("longer than 12 bytes");
    assert!(matches!(err, SerialError::LimitExceeded(_)));
}
