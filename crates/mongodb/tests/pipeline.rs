//! Export/import pipeline tests against the in-memory database.

mod common;

use common::MemoryDatabase;
use mongo_transfer_mongodb::{
    default_target_database, import_file, Orchestrator, TransferConfig, TransferError,
    DEFAULT_BATCH_SIZE,
};
use mongodb::bson::{doc, oid::ObjectId, spec::BinarySubtype, Binary, Bson, DateTime, Document};
use std::path::Path;
use tempfile::TempDir;

fn config(dir: &Path, database: &str, batch_size: usize) -> TransferConfig {
    TransferConfig {
        connection_string: "mongodb://localhost:27017".to_string(),
        database: database.to_string(),
        directory: dir.to_path_buf(),
        batch_size,
    }
}

fn oid(hex: &str) -> ObjectId {
    ObjectId::parse_str(hex).unwrap()
}

fn alice() -> Document {
    doc! {
        "_id": oid("507f1f77bcf86cd799439011"),
        "name": "Alice",
        "createdAt": DateTime::from_millis(1_704_067_200_000),
    }
}

fn nested_order() -> Document {
    let big: i64 = 1 << 40;
    doc! {
        "_id": oid("507f1f77bcf86cd799439012"),
        "total": 42.5,
        "items": [
            { "sku": "A-1", "qty": 2, "addedAt": DateTime::from_millis(1_704_067_200_123) },
            { "sku": "B-7", "qty": big, "tags": ["x", Bson::Null, true] },
        ],
        "owner": { "ref": oid("507f1f77bcf86cd799439011"), "note": "Zoë" },
    }
}

fn keys(doc: &Document) -> Vec<&str> {
    doc.keys().map(String::as_str).collect()
}

#[tokio::test]
async fn test_round_trip_preserves_documents() {
    let dir = TempDir::new().unwrap();
    let source = MemoryDatabase::new("shop")
        .with_collection("users", vec![alice()])
        .with_collection("orders", vec![nested_order()]);
    let orchestrator = Orchestrator::new(config(dir.path(), "shop", DEFAULT_BATCH_SIZE));

    let exported = orchestrator.export(&source).await.unwrap();
    assert!(exported.is_success());
    assert_eq!(exported.total_written(), 2);

    let target = MemoryDatabase::new(&default_target_database("shop"));
    let imported = orchestrator.import(&target).await.unwrap();
    assert!(imported.is_success());
    assert_eq!(imported.total_written(), 2);

    let orders = target.documents("orders");
    assert_eq!(orders, vec![nested_order()]);
    assert_eq!(keys(&orders[0]), vec!["_id", "total", "items", "owner"]);
    let items = orders[0].get_array("items").unwrap();
    let first = items[0].as_document().unwrap();
    assert_eq!(keys(first), vec!["sku", "qty", "addedAt"]);
    assert_eq!(target.documents("users"), vec![alice()]);
}

#[tokio::test]
async fn test_round_trip_keeps_doubles_exact() {
    let dir = TempDir::new().unwrap();
    let mut values = vec![1.0715660391465826e-75, 0.1, -0.0, 5e-324, f64::MAX, 1e21, 2.0];
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    while values.len() < 2000 {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let candidate = f64::from_bits(state);
        if candidate.is_finite() {
            values.push(candidate);
        }
    }
    let docs: Vec<Document> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let id = i as i32;
            let v = *v;
            doc! { "_id": id, "v": v }
        })
        .collect();
    let source = MemoryDatabase::new("lab").with_collection("samples", docs);
    let orchestrator = Orchestrator::new(config(dir.path(), "lab", DEFAULT_BATCH_SIZE));
    assert!(orchestrator.export(&source).await.unwrap().is_success());

    let target = MemoryDatabase::new("lab_imported");
    assert!(orchestrator.import(&target).await.unwrap().is_success());

    let imported = target.documents("samples");
    assert_eq!(imported.len(), values.len());
    for (doc, expected) in imported.iter().zip(&values) {
        let got = doc.get_f64("v").unwrap();
        assert_eq!(got.to_bits(), expected.to_bits(), "{got:e} != {expected:e}");
    }
}

#[tokio::test]
async fn test_snapshot_file_content() {
    let dir = TempDir::new().unwrap();
    let source = MemoryDatabase::new("shop").with_collection("users", vec![alice()]);
    let orchestrator = Orchestrator::new(config(dir.path(), "shop", DEFAULT_BATCH_SIZE));
    orchestrator.export(&source).await.unwrap();

    let text = std::fs::read_to_string(dir.path().join("shop").join("users.json")).unwrap();
    let expected = r#"[
  {
    "_id": {
      "$oid": "507f1f77bcf86cd799439011"
    },
    "name": "Alice",
    "createdAt": {
      "$date": "2024-01-01T00:00:00.000Z"
    }
  }
]
"#;
    assert_eq!(text, expected);
}

#[tokio::test]
async fn test_repeated_export_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let source = MemoryDatabase::new("shop")
        .with_collection("orders", vec![nested_order(), alice()]);
    let orchestrator = Orchestrator::new(config(dir.path(), "shop", DEFAULT_BATCH_SIZE));
    let path = dir.path().join("shop").join("orders.json");

    orchestrator.export(&source).await.unwrap();
    let first = std::fs::read(&path).unwrap();
    orchestrator.export(&source).await.unwrap();
    let second = std::fs::read(&path).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_export_counts_match_file_length() {
    let dir = TempDir::new().unwrap();
    let docs: Vec<Document> = (0..25)
        .map(|i| {
            let n = i * 2;
            doc! { "_id": i, "n": n }
        })
        .collect();
    let source = MemoryDatabase::new("metrics").with_collection("samples", docs);
    let orchestrator = Orchestrator::new(config(dir.path(), "metrics", DEFAULT_BATCH_SIZE));

    let report = orchestrator.export(&source).await.unwrap();
    let unit = report.unit("samples").unwrap();
    assert_eq!(unit.documents_seen, 25);
    assert_eq!(unit.documents_written, 25);

    let bytes = std::fs::read(dir.path().join("metrics").join("samples.json")).unwrap();
    let parsed: Vec<serde_json::Value> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed.len(), 25);
}

#[tokio::test]
async fn test_failing_collection_is_isolated() {
    let dir = TempDir::new().unwrap();
    let source = MemoryDatabase::new("shop")
        .with_collection("a", vec![doc! { "_id": 1 }, doc! { "_id": 2 }])
        .with_collection("b", vec![doc! { "_id": 1 }, doc! { "_id": 2 }])
        .with_collection("c", vec![doc! { "_id": 1 }])
        .fail_cursor_after("b", 1);
    let orchestrator = Orchestrator::new(config(dir.path(), "shop", DEFAULT_BATCH_SIZE));

    let report = orchestrator.export(&source).await.unwrap();
    assert!(!report.is_success());
    assert_eq!(report.units.len(), 2);
    assert_eq!(report.total_written(), 3);

    let failure = report.failure("b").unwrap();
    assert_eq!(failure.kind, "CollectionReadError");
    assert!(failure.error.contains("cursor killed by server"));

    let db_dir = dir.path().join("shop");
    assert!(db_dir.join("a.json").exists());
    assert!(!db_dir.join("b.json").exists());
    assert!(db_dir.join("c.json").exists());
}

#[tokio::test]
async fn test_failed_reexport_removes_previous_file() {
    let dir = TempDir::new().unwrap();
    let orchestrator = Orchestrator::new(config(dir.path(), "shop", DEFAULT_BATCH_SIZE));
    let path = dir.path().join("shop").join("users.json");

    let healthy = MemoryDatabase::new("shop").with_collection("users", vec![alice()]);
    orchestrator.export(&healthy).await.unwrap();
    assert!(path.exists());

    let failing = MemoryDatabase::new("shop")
        .with_collection("users", vec![alice()])
        .fail_cursor_after("users", 0);
    let report = orchestrator.export(&failing).await.unwrap();
    assert_eq!(report.failure("users").map(|f| f.kind.as_str()), Some("CollectionReadError"));
    assert!(!path.exists());
}

#[tokio::test]
async fn test_unsupported_type_fails_collection() {
    let dir = TempDir::new().unwrap();
    let blob = Binary {
        subtype: BinarySubtype::Generic,
        bytes: vec![1, 2, 3],
    };
    let source = MemoryDatabase::new("shop")
        .with_collection("files", vec![doc! { "_id": 1, "blob": blob }])
        .with_collection("users", vec![alice()]);
    let orchestrator = Orchestrator::new(config(dir.path(), "shop", DEFAULT_BATCH_SIZE));

    let report = orchestrator.export(&source).await.unwrap();
    let failure = report.failure("files").unwrap();
    assert_eq!(failure.kind, "UnsupportedType");
    assert!(failure.error.contains("at field 'blob'"));
    assert!(!dir.path().join("shop").join("files.json").exists());
    assert!(report.unit("users").is_some());
}

#[tokio::test]
async fn test_collection_listing_failure_is_fatal() {
    let dir = TempDir::new().unwrap();
    let source = MemoryDatabase::new("shop").fail_listing();
    let orchestrator = Orchestrator::new(config(dir.path(), "shop", DEFAULT_BATCH_SIZE));

    let err = orchestrator.export(&source).await.unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(err.kind(), "EnumerationError");
}

#[tokio::test]
async fn test_empty_collection_exports_empty_array() {
    let dir = TempDir::new().unwrap();
    let source = MemoryDatabase::new("shop").with_collection("empty", Vec::new());
    let orchestrator = Orchestrator::new(config(dir.path(), "shop", DEFAULT_BATCH_SIZE));

    let report = orchestrator.export(&source).await.unwrap();
    assert_eq!(report.unit("empty").map(|u| u.documents_written), Some(0));
    let bytes = std::fs::read(dir.path().join("shop").join("empty.json")).unwrap();
    assert_eq!(bytes, b"[]\n");

    let target = MemoryDatabase::new("shop_imported");
    let imported = orchestrator.import(&target).await.unwrap();
    assert!(imported.is_success());
    assert!(target.batch_sizes().is_empty());
}

fn write_snapshot(dir: &Path, database: &str, collection: &str, body: &str) {
    let db_dir = dir.join(database);
    std::fs::create_dir_all(&db_dir).unwrap();
    std::fs::write(db_dir.join(format!("{collection}.json")), body).unwrap();
}

#[tokio::test]
async fn test_malformed_file_inserts_nothing() {
    let dir = TempDir::new().unwrap();
    write_snapshot(
        dir.path(),
        "shop",
        "bad",
        r#"[{"_id": {"$oid": "507f1f77bcf86cd799439011"}}, {"_id": {"$oid": "not-hex"}}]"#,
    );
    write_snapshot(dir.path(), "shop", "good", r#"[{"_id": 1, "name": "ok"}]"#);
    let orchestrator = Orchestrator::new(config(dir.path(), "shop", DEFAULT_BATCH_SIZE));

    let target = MemoryDatabase::new("shop_imported");
    let report = orchestrator.import(&target).await.unwrap();

    let failure = report.failure("bad").unwrap();
    assert_eq!(failure.kind, "MalformedMarker");
    assert!(failure.error.contains("document 1"));
    assert!(target.documents("bad").is_empty());
    assert_eq!(target.documents("good"), vec![doc! { "_id": 1, "name": "ok" }]);
    assert!(!report.is_success());
}

#[tokio::test]
async fn test_unparseable_file_is_reported() {
    let dir = TempDir::new().unwrap();
    write_snapshot(dir.path(), "shop", "broken", "[{\"_id\": 1},");
    let orchestrator = Orchestrator::new(config(dir.path(), "shop", DEFAULT_BATCH_SIZE));

    let target = MemoryDatabase::new("shop_imported");
    let report = orchestrator.import(&target).await.unwrap();
    assert_eq!(report.failure("broken").map(|f| f.kind.as_str()), Some("ParseError"));
}

#[tokio::test]
async fn test_duplicate_ids_fail_fast() {
    let dir = TempDir::new().unwrap();
    let source = MemoryDatabase::new("shop").with_collection("users", vec![alice()]);
    let orchestrator = Orchestrator::new(config(dir.path(), "shop", DEFAULT_BATCH_SIZE));
    orchestrator.export(&source).await.unwrap();

    let target = MemoryDatabase::new("shop_imported").with_collection("users", vec![alice()]);
    let report = orchestrator.import(&target).await.unwrap();
    let failure = report.failure("users").unwrap();
    assert_eq!(failure.kind, "InsertError");
    assert!(failure.error.contains("duplicate key"));
    assert_eq!(target.documents("users").len(), 1);
}

#[tokio::test]
async fn test_files_imported_in_lexical_order() {
    let dir = TempDir::new().unwrap();
    for name in ["orders", "Users", "audit"] {
        write_snapshot(dir.path(), "shop", name, r#"[{"_id": 1}]"#);
    }
    std::fs::write(dir.path().join("shop").join("notes.txt"), "ignored").unwrap();
    let orchestrator = Orchestrator::new(config(dir.path(), "shop", DEFAULT_BATCH_SIZE));

    let target = MemoryDatabase::new("shop_imported");
    let report = orchestrator.import(&target).await.unwrap();
    assert!(report.is_success());
    assert_eq!(target.collection_names(), vec!["Users", "audit", "orders"]);
    let order: Vec<&str> = report.units.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(order, vec!["Users", "audit", "orders"]);
}

#[tokio::test]
async fn test_missing_snapshot_directory_is_fatal() {
    let dir = TempDir::new().unwrap();
    let orchestrator = Orchestrator::new(config(dir.path(), "nowhere", DEFAULT_BATCH_SIZE));

    let target = MemoryDatabase::new("nowhere_imported");
    let err = orchestrator.import(&target).await.unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, TransferError::Enumeration { .. }));
}

#[tokio::test]
async fn test_empty_snapshot_directory_succeeds() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("shop")).unwrap();
    let orchestrator = Orchestrator::new(config(dir.path(), "shop", DEFAULT_BATCH_SIZE));

    let target = MemoryDatabase::new("shop_imported");
    let report = orchestrator.import(&target).await.unwrap();
    assert!(report.is_success());
    assert!(report.units.is_empty());
}

#[tokio::test]
async fn test_import_chunks_batches() {
    let dir = TempDir::new().unwrap();
    let body = serde_json::to_string(
        &(0..5).map(|i| serde_json::json!({ "_id": i })).collect::<Vec<_>>(),
    )
    .unwrap();
    write_snapshot(dir.path(), "shop", "events", &body);

    let target = MemoryDatabase::new("shop_imported");
    let path = dir.path().join("shop").join("events.json");
    let inserted = import_file(&path, &target, "events", 2).await.unwrap();
    assert_eq!(inserted, 5);
    assert_eq!(target.batch_sizes(), vec![2, 2, 1]);
}

#[tokio::test]
async fn test_insert_failure_reports_committed_count() {
    let dir = TempDir::new().unwrap();
    write_snapshot(
        dir.path(),
        "shop",
        "events",
        r#"[{"_id": 1}, {"_id": 2}, {"_id": 3}, {"_id": 1}]"#,
    );

    let target = MemoryDatabase::new("shop_imported");
    let path = dir.path().join("shop").join("events.json");
    let err = import_file(&path, &target, "events", 2).await.unwrap_err();
    match err {
        TransferError::Insert { inserted, .. } => assert_eq!(inserted, 2),
        other => panic!("Expected Insert error, got {other:?}"),
    }
    assert_eq!(target.documents("events").len(), 3);
}
