#![cfg(feature = "cli")]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::process::{Command, Output};

const HEXCLI_EXE: &str = env!("CARGO_BIN_EXE_hexcli");
const SAMPLE_BIN: &str = "tests/fixtures/sample.bin";
const SAMPLE_HMF: &str = "tests/fixtures/sample.hmf";

fn run(args: &[&str]) -> Output {
    Command::new(HEXCLI_EXE)
        .args(args)
        .output()
        .expect("Failed to run hexcli")
}

fn assert_success(output: &Output) -> String {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_failure(output: &Output) -> String {
    assert!(!output.status.success(), "command unexpectedly succeeded");
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_hexcli_shows_help() {
    for flag in ["--help", "help", "-h"] {
        // Act
        let output = run(&[flag]);

        // Assert
        let stdout = assert_success(&output);
        assert!(
            stdout.contains("Usage"),
            "stdout did not look like help text:\n{stdout}"
        );
    }
}

#[test]
fn test_hexcli_without_command_fails() {
    // Act
    let output = run(&[]);

    // Assert
    let stderr = assert_failure(&output);
    assert!(stderr.contains("Usage"), "stderr:\n{stderr}");
}

#[test]
fn test_hexcli_info() {
    // Act
    let output = run(&["info", SAMPLE_BIN, "--markers", SAMPLE_HMF]);

    // Assert
    let stdout = assert_success(&output);
    assert!(stdout.contains("Data Size:   64 bytes"), "{stdout}");
    assert!(stdout.contains("Lines:       2 x 32 bytes"), "{stdout}");
    assert!(stdout.contains("Markers:     3"), "{stdout}");
}

#[test]
fn test_hexcli_info_missing_file() {
    // Act
    let output = run(&["info", "tests/fixtures/nope.bin"]);

    // Assert
    let stderr = assert_failure(&output);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("Error:"), "{stderr}");
}

#[test]
fn test_hexcli_types() {
    // Act
    let output = run(&["types"]);

    // Assert
    let stdout = assert_success(&output);
    for name in ["int8", "uint64", "bits8", "double", "utf16", "hex"] {
        assert!(stdout.contains(name), "missing {name}:\n{stdout}");
    }
    assert!(stdout.contains("16 bytes (variable)"), "{stdout}");
}

#[test]
fn test_hexcli_decode() {
    // Act
    let typed = run(&["decode", SAMPLE_BIN, "0x4", "--type", "uint32"]);
    let all = run(&["decode", SAMPLE_BIN, "8"]);

    // Assert
    assert_eq!(assert_success(&typed).trim(), "42");
    let stdout = assert_success(&all);
    assert!(stdout.contains("Offset:      0x00000008"), "{stdout}");
    assert!(stdout.contains("1.5"), "{stdout}");
}

#[test]
fn test_hexcli_decode_unknown_type() {
    // Act
    let output = run(&["decode", SAMPLE_BIN, "0", "--type", "int24"]);

    // Assert
    let stderr = assert_failure(&output);
    assert!(stderr.contains("Unknown data type"), "{stderr}");
}

#[test]
fn test_hexcli_encode() {
    // Act
    let ok = run(&["encode", "int16", "-2"]);
    let bad = run(&["encode", "uint8", "256"]);

    // Assert
    assert_eq!(assert_success(&ok).trim(), "FE FF");
    let stderr = assert_failure(&bad);
    assert!(stderr.contains("Cannot parse '256' as uint8"), "{stderr}");
}

#[test]
fn test_hexcli_search() {
    // Act
    let hex = run(&["search", SAMPLE_BIN, "--hex", "2A000000"]);
    let typed = run(&["search", SAMPLE_BIN, "--typed", "ascii", "--value", "world"]);
    let none = run(&["search", SAMPLE_BIN, "--ascii", "nothing here"]);

    // Assert
    let stdout = assert_success(&hex);
    assert!(stdout.contains("0x00000004"), "{stdout}");
    assert!(stdout.contains("1 match(es)"), "{stdout}");
    assert!(assert_success(&typed).contains("0x00000016"));
    assert!(assert_success(&none).contains("0 match(es)"));
}

#[test]
fn test_hexcli_dump_with_markers() {
    // Act
    let output = run(&[
        "dump",
        SAMPLE_BIN,
        "--bytes-per-line",
        "16",
        "--markers",
        SAMPLE_HMF,
    ]);

    // Assert
    let stdout = assert_success(&output);
    assert!(stdout.contains("0x00000000  48 58 52 31"), "{stdout}");
    assert!(stdout.contains("HXR1"), "{stdout}");
    assert!(stdout.contains("^ uint32"), "{stdout}");
    assert!(stdout.contains("count"), "{stdout}");
    assert_eq!(stdout.lines().filter(|l| l.starts_with("0x")).count(), 4);
}

#[test]
fn test_hexcli_dump_with_huge_line_count() {
    // Act
    let output = run(&["dump", SAMPLE_BIN, "--offset", "0x20", "--lines", &usize::MAX.to_string()]);

    // Assert
    let stdout = assert_success(&output);
    assert_eq!(stdout.lines().filter(|l| l.starts_with("0x")).count(), 1, "{stdout}");
}

#[test]
fn test_hexcli_edit_to_output() {
    // Arrange
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("edited.bin");
    let out_str = out.to_string_lossy().into_owned();

    // Act
    let output = run(&[
        "edit", SAMPLE_BIN, "0x10", "ascii", "HELLO", "--output", &out_str,
    ]);

    // Assert
    assert_success(&output);
    let edited = std::fs::read(&out).expect("edited file");
    assert_eq!(&edited[16..24], b"HELLO\0\0\0");
    let original = std::fs::read(SAMPLE_BIN).expect("sample");
    assert_eq!(&original[16..21], b"hello");
}

#[test]
fn test_hexcli_markers_workflow() {
    // Arrange
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("session.hmf");
    let file_str = file.to_string_lossy().into_owned();

    // Act
    let add_1 = run(&[
        "markers",
        "add",
        &file_str,
        "0x10",
        "ascii",
        "--note",
        "greeting",
        "--num-bytes",
        "11",
    ]);
    let add_2 = run(&["markers", "add", &file_str, "0x4", "uint32"]);
    let dup = run(&["markers", "add", &file_str, "0x4", "int8"]);
    let remove = run(&["markers", "remove", &file_str, "0x4"]);
    let remove_again = run(&["markers", "remove", &file_str, "0x4"]);
    let list = run(&["markers", "list", &file_str]);

    // Assert
    assert_success(&add_1);
    assert_success(&add_2);
    assert!(assert_failure(&dup).contains("Marker already exists"));
    assert_success(&remove);
    assert!(assert_failure(&remove_again).contains("No marker found"));

    let stdout = assert_success(&list);
    assert_eq!(stdout.lines().count(), 1, "{stdout}");
    assert!(stdout.contains("0x00000010"), "{stdout}");
    assert!(stdout.contains("greeting"), "{stdout}");
    assert!(stdout.contains("11 bytes"), "{stdout}");
}

#[test]
fn test_hexcli_config_file() {
    // Arrange
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = dir.path().join("hexer.json");
    std::fs::write(&cfg, r#"{ "bytes_per_line": 8 }"#).expect("config");
    let cfg_str = cfg.to_string_lossy().into_owned();

    // Act
    let output = run(&["info", SAMPLE_BIN, "--config", &cfg_str]);
    let invalid = run(&["info", SAMPLE_BIN, "--bytes-per-line", "0"]);

    // Assert
    assert!(assert_success(&output).contains("Lines:       8 x 8 bytes"));
    assert!(assert_failure(&invalid).contains("bytes_per_line must be > 0"));
}
