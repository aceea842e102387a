#![allow(clippy::unwrap_used)]

use hexerlib::{
    DataType, HexerError, MarkerRepository, SearchType, Workbench, WorkbenchConfig,
    known_data_types,
};
use std::fs;
use std::path::Path;

const SAMPLE_BIN: &str = "tests/fixtures/sample.bin";
const SAMPLE_HMF: &str = "tests/fixtures/sample.hmf";
const DUPLICATE_HMF: &str = "tests/fixtures/duplicate.hmf";

fn open_sample() -> Workbench {
    let mut wb = Workbench::default();
    wb.open_file(SAMPLE_BIN).unwrap();
    wb
}

fn marker_summary(repo: &MarkerRepository) -> Vec<(usize, String, usize, String)> {
    repo.markers()
        .map(|m| (m.address, m.data_type.to_string(), m.num_bytes, m.note.clone()))
        .collect()
}

#[test]
fn test_decode_sample_fields() {
    // Arrange
    let wb = open_sample();

    // Act
    let magic = wb.decode("ascii", &wb.fragment_at(0).unwrap()).unwrap();
    let count = wb.decode("uint32", &wb.fragment_at(4 * 8).unwrap()).unwrap();
    let scale = wb.decode("float", &wb.fragment_at(8 * 8).unwrap()).unwrap();
    let text = wb.decode("ascii", &wb.fragment_at(16 * 8).unwrap()).unwrap();
    let tail = wb.decode("uint64", &wb.fragment_at(60 * 8).unwrap()).unwrap();

    // Assert
    assert_eq!(magic, "HXR1");
    assert_eq!(count, "42");
    assert_eq!(scale, "1.5");
    assert_eq!(text, "hello wo");
    assert_eq!(tail, "--"); // only 4 bytes left
}

#[test]
fn test_encode_decode_round_trip_for_every_type() {
    // Arrange
    let samples = [
        ("int8", "-128"),
        ("uint8", "255"),
        ("int16", "-300"),
        ("uint16", "65535"),
        ("int32", "-2147483648"),
        ("uint32", "4294967295"),
        ("int64", "-9223372036854775808"),
        ("uint64", "18446744073709551615"),
        ("bits8", "10100101"),
        ("float", "-2.25"),
        ("double", "3.141592653589793"),
        ("ascii", "ABCDEFGH"),
        ("utf16", "Grüße"),
        ("hex", "DE AD BE EF 00 11 22 33"),
    ];
    assert_eq!(samples.len(), known_data_types().count());

    for (name, text) in samples {
        let dt = DataType::from_name(name).unwrap();

        // Act
        let fragment = dt.encode_string(0x40, text).unwrap();
        let decoded = dt.decode_to_string(&fragment);

        // Assert
        assert_eq!(fragment.len(), dt.num_bytes(), "{name}");
        assert_eq!(decoded, text, "{name}");
    }
}

#[test]
fn test_load_sample_markers() {
    // Arrange
    let mut wb = open_sample();

    // Act
    let res = wb.load_markers(SAMPLE_HMF);

    // Assert
    assert!(res.is_ok());
    assert_eq!(wb.markers().len(), 3);
    assert_eq!(wb.lookup_marker(32).map(|m| m.note.as_str()), Some("count"));
    assert_eq!(wb.lookup_covering_marker(24).map(|m| m.note.as_str()), Some("magic"));
    assert_eq!(wb.lookup_covering_marker(95).map(|m| m.address), Some(64));
    assert!(wb.lookup_covering_marker(96).is_none());
}

#[test]
fn test_save_and_load_populated_repository() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("markers/round_trip.hmf");

    let mut repo = MarkerRepository::new();
    repo.add_marker(0, DataType::from_name("ascii").unwrap()).unwrap();
    repo.add_marker(80, DataType::from_name("int32").unwrap()).unwrap();
    repo.add_marker(8000, DataType::from_name("double").unwrap()).unwrap();

    let mut edited = repo.get_marker(0).cloned().unwrap();
    edited.num_bytes = 20;
    edited.note = "file \"header\"".into();
    repo.update_marker(edited).unwrap();

    // Act
    let saved = repo.save_to_file(Some(&path));
    let mut loaded = MarkerRepository::new();
    let res = loaded.load_from_file(&path);

    // Assert
    assert!(saved.is_ok());
    assert!(res.is_ok());
    assert_eq!(marker_summary(&loaded), marker_summary(&repo));
    assert_eq!(loaded.filepath(), Some(path.as_path()));
}

#[test]
fn test_marker_file_layout() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.hmf");
    let mut repo = MarkerRepository::new();
    repo.add_marker(160, DataType::from_name("uint16").unwrap()).unwrap();
    repo.add_marker(16, DataType::from_name("int8").unwrap()).unwrap();

    // Act
    repo.save_to_file(Some(&path)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

    // Assert
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["address"], 16);
    assert_eq!(records[0]["typeName"], "int8");
    assert_eq!(records[1]["numBytes"], 2);
    assert_eq!(records[1]["note"], "Unnamed");
}

#[test]
fn test_save_and_load_empty_repository() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.hmf");
    let mut repo = MarkerRepository::new();

    // Act
    repo.save_to_file(Some(&path)).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    let mut loaded = MarkerRepository::new();
    loaded.add_marker(8, DataType::from_name("uint8").unwrap()).unwrap();
    let res = loaded.load_from_file(&path);

    // Assert
    assert_eq!(content.trim(), "[]");
    assert!(res.is_ok());
    assert!(loaded.is_empty());
}

#[test]
fn test_load_replaces_existing_markers() {
    // Arrange
    let mut repo = MarkerRepository::new();
    repo.add_marker(1024, DataType::from_name("double").unwrap()).unwrap();

    // Act
    repo.load_from_file(SAMPLE_HMF).unwrap();

    // Assert
    assert!(!repo.is_marker(1024));
    assert_eq!(
        repo.markers().map(|m| m.address).collect::<Vec<_>>(),
        vec![0, 32, 64]
    );
}

#[test]
fn test_failed_load_leaves_repository_unchanged() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let malformed = dir.path().join("malformed.hmf");
    let unknown = dir.path().join("unknown.hmf");
    fs::write(&malformed, "[{\"typeName\": \"int8\", \"address\": 8,").unwrap();
    fs::write(
        &unknown,
        r#"[{"typeName": "int24", "address": 8, "numBytes": 3, "note": ""}]"#,
    )
    .unwrap();

    let mut repo = MarkerRepository::new();
    repo.add_marker(8, DataType::from_name("uint8").unwrap()).unwrap();
    let before = marker_summary(&repo);

    // Act
    let dup = repo.load_from_file(DUPLICATE_HMF);
    let bad_json = repo.load_from_file(&malformed);
    let bad_type = repo.load_from_file(&unknown);
    let missing = repo.load_from_file(dir.path().join("missing.hmf"));

    // Assert
    assert!(matches!(dup, Err(HexerError::DuplicateKey(0))));
    assert!(matches!(bad_json, Err(HexerError::MarkerFormat(_))));
    assert!(matches!(bad_type, Err(HexerError::UnknownType(_))));
    assert!(matches!(missing, Err(HexerError::Io { .. })));
    assert_eq!(marker_summary(&repo), before);
    assert!(!repo.has_file_name());
}

#[test]
fn test_load_rejects_marker_past_address_space() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("overflow.hmf");
    let address = usize::MAX - 7;
    fs::write(
        &path,
        format!(r#"[{{"typeName": "int32", "address": {address}, "numBytes": 4, "note": ""}}]"#),
    )
    .unwrap();

    let mut wb = Workbench::default();
    wb.open_bytes(vec![0; 16]);
    wb.add_marker(8, "uint8").unwrap();

    // Act
    let res = wb.load_markers(&path);
    let add = wb.add_marker(address, "int32");

    // Assert
    assert!(matches!(res, Err(HexerError::InvalidArgument(_))));
    assert!(matches!(add, Err(HexerError::InvalidArgument(_))));
    assert_eq!(wb.markers().len(), 1);
    assert!(wb.lookup_covering_marker(usize::MAX).is_none());
}

#[test]
fn test_save_markers_next_to_document() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("firmware.bin");
    fs::copy(SAMPLE_BIN, &bin).unwrap();

    let mut wb = Workbench::default();
    wb.open_file(&bin).unwrap();
    wb.add_marker(0, "ascii").unwrap();

    // Act
    let res = wb.save_markers(None);

    // Assert
    assert!(res.is_ok());
    let expected = dir.path().join("firmware.hmf");
    assert!(Path::new(&expected).is_file());
    assert_eq!(wb.markers().filepath(), Some(expected.as_path()));
}

#[test]
fn test_edit_and_save_document() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("edited.bin");
    let mut wb = open_sample();

    // Act
    let fragment = wb.encode("uint32", 4 * 8, "0x01020304").unwrap();
    wb.apply_edit(&fragment).unwrap();
    wb.save_file(Some(&out)).unwrap();

    let mut reopened = Workbench::default();
    reopened.open_file(&out).unwrap();

    // Assert
    let original = fs::read(SAMPLE_BIN).unwrap();
    let edited = fs::read(&out).unwrap();
    assert_eq!(&edited[4..8], &[4, 3, 2, 1]);
    assert_eq!(&edited[8..], &original[8..]);
    assert_eq!(
        reopened.decode("uint32", &reopened.fragment_at(32).unwrap()).unwrap(),
        "16909060"
    );
}

#[test]
fn test_typed_search_in_sample() {
    // Arrange
    let mut wb = open_sample();

    // Act
    let float_hit = wb.search_typed("float", "1.5").unwrap();
    let text_hit = wb.search_typed("ascii", "world").unwrap();
    let all = wb.search_all(&SearchType::Regex(r"[a-z]{5}".into())).unwrap();

    // Assert
    assert_eq!(float_hit, Some(8 * 8));
    assert_eq!(text_hit, Some(22 * 8));
    assert_eq!(wb.viewport().selected_address, Some(22 * 8));
    assert_eq!(all, vec![16 * 8, 22 * 8]);
}

#[test]
fn test_config_drives_viewport() {
    // Arrange
    let config = WorkbenchConfig {
        bytes_per_line: 8,
        ..WorkbenchConfig::default()
    };
    let mut wb = Workbench::new(config);

    // Act
    wb.open_file(SAMPLE_BIN).unwrap();

    // Assert
    assert_eq!(wb.viewport().total_lines(), 8);
    assert_eq!(wb.viewport().line_address(3), 3 * 8 * 8);
}
