// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::error::ViewError;
use crate::snapshot::{decode_view, encode_view, ViewDocument, SCHEMA_VERSION};
use crate::view::View;

fn sample_view() -> View {
    let mut view = View::from_members([("http://10.0.0.1:4000", 1u16), ("http://10.0.0.2:4000", 7)])
        .unwrap();
    view.set_metadata("app", "demo");
    view.set_metadata("zone", "b");
    view
}

#[test]
fn test_file_roundtrip_preserves_order_and_metadata() {
    let view = sample_view();
    let bytes = encode_view(&view).unwrap();
    let restored = decode_view(&bytes).unwrap();

    let order: Vec<_> = restored.members().cloned().collect();
    let expected: Vec<_> = view.members().cloned().collect();
    assert_eq!(order, expected);
    assert_eq!(restored.metadata(), view.metadata());
    assert_eq!(restored.version(), view.version());
    assert_eq!(restored.digest(), view.digest());
}

#[test]
fn test_document_fields() {
    let bytes = encode_view(&sample_view()).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["schema_version"], SCHEMA_VERSION);
    assert_eq!(json["members"][1]["provider_id"], 7);
    assert_eq!(json["metadata"]["app"], "demo");
    assert_eq!(json["digest"].as_str().unwrap().len(), 64);
}

#[test]
fn test_version_is_optional() {
    let view = View::from_members([("a", 1u16)]).unwrap();
    let text = format!(
        r#"{{"schema_version":1,"members":[{{"address":"a","provider_id":1}}],"digest":"{}"}}"#,
        view.digest()
    );
    let parsed = decode_view(text.as_bytes()).unwrap();
    assert_eq!(parsed.version(), 0);
    assert!(parsed.same_content(&view));
}

#[test]
fn test_rejects_digest_mismatch() {
    let mut doc = ViewDocument::from(&sample_view());
    doc.digest = View::new().digest();
    let bytes = serde_json::to_vec(&doc).unwrap();

    assert!(matches!(decode_view(&bytes), Err(ViewError::MalformedFile(_))));
}

#[test]
fn test_rejects_unknown_schema() {
    let mut doc = ViewDocument::from(&sample_view());
    doc.schema_version = 99;
    let bytes = serde_json::to_vec(&doc).unwrap();

    let err = decode_view(&bytes).unwrap_err();
    assert!(err.to_string().contains("schema_version"));
}

#[test]
fn test_rejects_duplicate_members() {
    let text = r#"{"schema_version":1,"members":[
        {"address":"a","provider_id":1},{"address":"a","provider_id":1}],
        "digest":"0000000000000000000000000000000000000000000000000000000000000000"}"#;
    assert!(matches!(
        decode_view(text.as_bytes()),
        Err(ViewError::MalformedFile(_))
    ));
}

#[test]
fn test_rejects_garbage() {
    let bad_inputs: [&[u8]; 4] = [b"not json", b"{}", b"[]", br#"{"schema_version":1}"#];
    for bad in bad_inputs {
        assert!(matches!(decode_view(bad), Err(ViewError::MalformedFile(_))));
    }
}

#[test]
fn test_view_serde_uses_document() {
    let view = sample_view();
    let json = serde_json::to_string(&view).unwrap();
    let back: View = serde_json::from_str(&json).unwrap();
    assert_eq!(back, view);
}
