use std::path::PathBuf;

use ollascan::errors::OllascanError;
use ollascan::models::Target;
use ollascan::resolver::{resolve_file, resolve_range};

fn write_fixture(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn csv_colon_in_host_cell_overrides_port_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "targets.csv", b"Target,port\nhttp://1.2.3.4:9999/x,8080\n");

    let targets = resolve_file(&path).unwrap();
    assert_eq!(targets, vec![Target::new("1.2.3.4", 9999)]);
}

#[test]
fn csv_port_column_and_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(
        &dir,
        "targets.csv",
        b"IP Address,Port\n10.0.0.1,8080\n10.0.0.2,\n10.0.0.3,not-a-port\n",
    );

    let targets = resolve_file(&path).unwrap();
    assert_eq!(
        targets,
        vec![
            Target::new("10.0.0.1", 8080),
            Target::new("10.0.0.2", 11434),
            Target::new("10.0.0.3", 11434),
        ]
    );
}

#[test]
fn csv_skips_rows_with_empty_host() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(
        &dir,
        "targets.csv",
        b"host,port\n,8080\nhttps://example.com/path,9000\nhttp://,80\n",
    );

    let targets = resolve_file(&path).unwrap();
    assert_eq!(targets, vec![Target::new("example.com", 9000)]);
}

#[test]
fn csv_without_host_column_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "targets.csv", b"name,count\nfoo,1\nbar,2\n");

    assert!(resolve_file(&path).unwrap().is_empty());
}

#[test]
fn csv_gbk_encoded_file_is_decoded_via_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let (encoded, _, _) = encoding_rs::GBK.encode("地址,端口\n192.168.1.5,9001\n");
    let path = write_fixture(&dir, "targets.csv", &encoded);

    let targets = resolve_file(&path).unwrap();
    assert_eq!(targets, vec![Target::new("192.168.1.5", 9001)]);
}

#[test]
fn json_canonical_results_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(
        &dir,
        "targets.json",
        br#"{"results": [
            {"ip": "1.1.1.1", "port": 11434},
            {"host": "http://2.2.2.2:9000/path", "port": "8080"},
            {"domain": "example.com"},
            {"comment": "no host keys here"}
        ]}"#,
    );

    let targets = resolve_file(&path).unwrap();
    assert_eq!(
        targets,
        vec![
            Target::new("1.1.1.1", 11434),
            // scheme/path stripped; the port field wins in the canonical shape
            Target::new("2.2.2.2:9000", 8080),
            Target::new("example.com", 11434),
        ]
    );
}

#[test]
fn json_fallback_walk_finds_nested_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(
        &dir,
        "targets.json",
        br#"{
            "meta": {"query": "ollama"},
            "data": {
                "page1": [
                    {"ip": "10.1.0.1", "port": 11434},
                    {"wrapper": {"host": "10.1.0.2"}}
                ]
            }
        }"#,
    );

    let targets = resolve_file(&path).unwrap();
    assert_eq!(
        targets,
        vec![Target::new("10.1.0.1", 11434), Target::new("10.1.0.2", 11434)]
    );
}

#[test]
fn malformed_json_is_a_hard_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "targets.json", b"{not json");

    assert!(matches!(resolve_file(&path), Err(OllascanError::Json(_))));
}

#[test]
fn unsupported_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "targets.txt", b"1.2.3.4\n");

    assert!(matches!(
        resolve_file(&path),
        Err(OllascanError::UnsupportedFormat(_))
    ));
}

#[test]
fn missing_file_is_a_hard_error() {
    assert!(matches!(
        resolve_file("/nonexistent/targets.csv"),
        Err(OllascanError::Io(_))
    ));
}

#[test]
fn cidr_emits_usable_hosts_with_configured_port() {
    let targets = resolve_range("192.168.0.0/28", 9000);
    assert_eq!(targets.len(), 14);
    assert_eq!(targets[0], Target::new("192.168.0.1", 9000));
    assert_eq!(targets[13], Target::new("192.168.0.14", 9000));
}

#[test]
fn dash_range_and_shorthand() {
    let targets = resolve_range("192.168.1.10-192.168.1.12", 11434);
    assert_eq!(
        targets,
        vec![
            Target::new("192.168.1.10", 11434),
            Target::new("192.168.1.11", 11434),
            Target::new("192.168.1.12", 11434),
        ]
    );

    assert_eq!(resolve_range("10.0.0.5-20", 11434).len(), 16);
}
