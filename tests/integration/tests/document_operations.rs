//! Document behavior against the spec's concrete scenarios.

use keepsafe_vault::{AccountRecord, Document, VaultError};

#[test]
fn test_fresh_store_dumps_empty_accounts() {
    let doc = Document::new_empty();
    let compact = String::from_utf8(doc.serialize_compact().unwrap()).unwrap();
    assert_eq!(compact, r#"{"accounts":{}}"#);
}

#[test]
fn test_add_then_query() {
    let mut doc = Document::new_empty();
    doc.set("github", AccountRecord::new("alice", "s3cr3t"));

    let record = doc.get("github").unwrap();
    assert_eq!(record.user, "alice");
    assert_eq!(record.secret.expose_secret(), "s3cr3t");
}

#[test]
fn test_edit_keeps_blank_fields() {
    let mut doc = Document::new_empty();
    doc.set("github", AccountRecord::new("alice", "s3cr3t"));

    // The command layer substitutes the prior user for blank input and
    // re-supplies the record wholesale.
    let current = doc.get("github").cloned().unwrap();
    let user = {
        let input = "";
        if input.is_empty() { current.user.clone() } else { input.to_string() }
    };
    doc.set("github", AccountRecord::new(user, "t0ps3cr3t"));

    let record = doc.get("github").unwrap();
    assert_eq!(record.user, "alice");
    assert_eq!(record.secret.expose_secret(), "t0ps3cr3t");
}

#[test]
fn test_remove_then_query_fails() {
    let mut doc = Document::new_empty();
    doc.set("github", AccountRecord::new("alice", "s3cr3t"));

    doc.delete("github").unwrap();
    assert!(doc.get("github").is_none());
    assert!(matches!(doc.delete("github"), Err(VaultError::NotFound(_))));
}

#[test]
fn test_search_prefix_set() {
    let mut doc = Document::new_empty();
    doc.set("github", AccountRecord::new("alice", "a"));
    doc.set("gitlab", AccountRecord::new("bob", "b"));
    doc.set("example", AccountRecord::new("carol", "c"));

    let hits = doc.find("^git").unwrap();
    let ids: Vec<&str> = hits.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["github", "gitlab"]);
}

#[test]
fn test_wire_format_survives_round_trip() {
    let mut doc = Document::new_empty();
    doc.set("github", AccountRecord::new("alice", "s3cr3t"));

    let bytes = doc.serialize_compact().unwrap();

    // The wire shape is exactly {"accounts": {id: {user, pass, date}}}.
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let entry = &value["accounts"]["github"];
    assert_eq!(entry["user"], "alice");
    assert_eq!(entry["pass"], "s3cr3t");
    assert!(entry["date"].as_str().unwrap().len() == 19);

    let reloaded = Document::parse(&bytes).unwrap();
    assert_eq!(reloaded, doc);
}
