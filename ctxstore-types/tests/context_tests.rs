use ctxstore_types::{ContextId, ContextKind, Error, StorageChange};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

// ── ContextId ───────────────────────────────────────────────────

#[test]
fn context_ids_are_unique() {
    let a = ContextId::new();
    let b = ContextId::new();
    assert_ne!(a, b);
}

#[test]
fn context_id_display_parse_roundtrip() {
    let id = ContextId::new();
    let parsed = ContextId::parse(&id.to_string()).unwrap();
    assert_eq!(id, parsed);

    let from_str: ContextId = id.to_string().parse().unwrap();
    assert_eq!(id, from_str);
}

#[test]
fn context_id_parse_rejects_garbage() {
    let err = ContextId::parse("not-a-uuid").unwrap_err();
    assert!(matches!(err, Error::InvalidUuid(_)));
    assert!(matches!("not-a-uuid".parse::<ContextId>(), Err(Error::InvalidUuid(_))));
}

#[test]
fn context_id_serializes_transparently() {
    let id = ContextId::new();
    let value = serde_json::to_value(id).unwrap();
    assert_eq!(value, json!(id.to_string()));
}

#[test]
fn context_ids_are_time_ordered() {
    let first = ContextId::new();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = ContextId::new();
    assert!(first < second);
}

// ── ContextKind ─────────────────────────────────────────────────

#[test]
fn only_background_is_privileged() {
    assert!(ContextKind::Background.is_privileged());
    assert!(!ContextKind::Content.is_privileged());
    assert!(!ContextKind::Popup.is_privileged());
}

#[test]
fn context_kind_string_roundtrip() {
    for kind in [ContextKind::Background, ContextKind::Content, ContextKind::Popup] {
        let parsed: ContextKind = kind.as_str().parse().unwrap();
        assert_eq!(parsed, kind);
        assert_eq!(kind.to_string(), kind.as_str());
    }
}

#[test]
fn context_kind_unknown_name_errors() {
    let err = "sidebar".parse::<ContextKind>().unwrap_err();
    assert!(err.to_string().contains("sidebar"));
}

// ── StorageChange ───────────────────────────────────────────────

#[test]
fn removal_has_no_new_value() {
    let change = StorageChange::new("theme", Some(json!("dark")), None);
    assert!(change.is_removal());

    let change = StorageChange::new("theme", None, Some(json!("dark")));
    assert!(!change.is_removal());
}

#[test]
fn change_omits_absent_values_on_the_wire() {
    let change = StorageChange::new("theme", None, Some(json!("dark")));
    let value = serde_json::to_value(&change).unwrap();
    assert_eq!(value, json!({ "key": "theme", "new_value": "dark" }));

    let back: StorageChange = serde_json::from_value(value).unwrap();
    assert_eq!(back, change);
}

proptest! {
    #[test]
    fn any_uuid_string_parses(bits in any::<u128>()) {
        let uuid = uuid::Uuid::from_u128(bits);
        let id = ContextId::parse(&uuid.to_string()).unwrap();
        prop_assert_eq!(id.as_uuid(), uuid);
    }
}
