use ctxstore_schema::slots::{self, ActionConfig, ActionType, Module, ModuleIcon, Prompt, Theme};
use ctxstore_schema::{KeyDescriptor, KeyRegistry, Schema, SchemaError};
use pretty_assertions::assert_eq;
use serde_json::json;

// ── theme ───────────────────────────────────────────────────────

#[test]
fn theme_descriptor_defaults_to_light() {
    let d = slots::theme::descriptor();
    assert_eq!(d.key(), "theme");
    assert_eq!(*d.default_value(), Theme::Light);
    assert!(d.description().is_some());
}

#[test]
fn theme_wire_format_is_lowercase() {
    assert_eq!(serde_json::to_value(Theme::Dark).unwrap(), json!("dark"));
    let back: Theme = serde_json::from_value(json!("light")).unwrap();
    assert_eq!(back, Theme::Light);
}

#[test]
fn theme_toggle() {
    assert_eq!(Theme::Light.toggled(), Theme::Dark);
    assert_eq!(Theme::Dark.toggled(), Theme::Light);
}

#[test]
fn theme_schema_rejects_unknown_theme() {
    let d = slots::theme::descriptor();
    assert!(d.validate_json(&json!("dark")).is_ok());
    assert!(d.validate_json(&json!("sepia")).is_err());
}

// ── prompts ─────────────────────────────────────────────────────

#[test]
fn prompts_default_is_empty() {
    let d = slots::prompts::descriptor();
    assert_eq!(d.key(), "prompts");
    assert!(d.default_value().is_empty());
}

#[test]
fn prompt_new_stamps_and_ids() {
    let p = Prompt::new("Greeting", "Say hello", vec!["intro".into()]);
    assert_eq!(p.created_at, p.updated_at);
    assert!(p.created_at > 0);
    assert!(!p.id.is_empty());
    assert_ne!(p.id, Prompt::new("Greeting", "Say hello", vec![]).id);
}

#[test]
fn prompt_uses_camel_case_on_the_wire() {
    let mut p = Prompt::new("t", "c", vec![]);
    p.is_linked_to_action = Some(true);
    let value = serde_json::to_value(&p).unwrap();
    assert!(value.get("createdAt").is_some());
    assert!(value.get("updatedAt").is_some());
    assert_eq!(value["isLinkedToAction"], json!(true));
}

#[test]
fn prompt_list_validates() {
    let d = slots::prompts::descriptor();
    let prompts = vec![Prompt::new("a", "b", vec!["x".into()])];
    assert!(d.validate(&prompts).is_ok());

    let bad = json!([{ "id": "1", "title": "t", "content": "c", "tags": [1], "createdAt": 0, "updatedAt": 0 }]);
    let err = d.validate_json(&bad).unwrap_err();
    match err {
        SchemaError::Validation { source, .. } => assert_eq!(source.path, "/0/tags/0"),
        other => panic!("unexpected error {other:?}"),
    }
}

// ── modules ─────────────────────────────────────────────────────

#[test]
fn modules_default_has_two_disabled_modules() {
    let d = slots::modules::descriptor();
    let ids: Vec<&str> = d.default_value().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["prompt-manager", "ai-chat"]);
    assert!(d.default_value().iter().all(|m| !m.enabled));
}

#[test]
fn module_icon_is_a_closed_set() {
    let ok: Module = serde_json::from_value(json!({
        "id": "x", "name": "X", "description": "", "icon": "Sparkles", "enabled": true, "order": 3
    }))
    .unwrap();
    assert_eq!(ok.icon, ModuleIcon::Sparkles);

    let unknown = serde_json::from_value::<Module>(json!({
        "id": "x", "name": "X", "description": "", "icon": "Rocket", "enabled": true, "order": 3
    }));
    assert!(unknown.is_err());

    let d = slots::modules::descriptor();
    assert!(d
        .validate_json(&json!([{ "id": "x", "name": "X", "description": "", "icon": "Rocket", "enabled": true, "order": 3 }]))
        .is_err());
}

// ── action-config ───────────────────────────────────────────────

#[test]
fn action_config_default() {
    let d = slots::actions::descriptor();
    assert_eq!(d.key(), "action-config");
    assert_eq!(d.default_value().action_type, ActionType::Copy);
    assert!(!d.default_value().enabled);
    assert!(d.default_value().prompt_id.is_none());
}

#[test]
fn action_config_default_is_stable() {
    let first = slots::actions::descriptor();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = slots::actions::descriptor();
    assert_eq!(first.default_value(), second.default_value());
    assert_eq!(first, second);
}

#[test]
fn action_config_wire_format() {
    let config = ActionConfig {
        action_type: ActionType::Custom,
        enabled: true,
        prompt_id: Some("p1".into()),
        custom_config: None,
        updated_at: 5,
    };
    let value = serde_json::to_value(&config).unwrap();
    assert_eq!(
        value,
        json!({ "type": "custom", "enabled": true, "promptId": "p1", "updatedAt": 5 })
    );
    assert!(slots::actions::descriptor().validate(&config).is_ok());
}

// ── KeyRegistry ─────────────────────────────────────────────────

#[test]
fn builtin_registry_has_every_slot() {
    let registry = KeyRegistry::builtin().unwrap();
    let keys: Vec<&str> = registry.keys().collect();
    assert_eq!(keys, vec!["action-config", "modules", "prompts", "theme"]);
    assert_eq!(registry.len(), 4);
    assert!(!registry.is_empty());
}

#[test]
fn registry_rejects_duplicate_key() {
    let mut registry = KeyRegistry::new();
    registry.register(&slots::theme::descriptor()).unwrap();
    let err = registry.register(&slots::theme::descriptor()).unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateKey(key) if key == "theme"));
}

#[test]
fn registry_rejects_invalid_default() {
    let mut registry = KeyRegistry::new();
    let bad = KeyDescriptor::new("n", "text", Schema::integer());
    assert!(matches!(
        registry.register(&bad),
        Err(SchemaError::InvalidDefault { .. })
    ));
    assert!(registry.is_empty());
}

#[test]
fn registry_validates_known_keys_only() {
    let registry = KeyRegistry::builtin().unwrap();
    assert!(registry.validate("theme", &json!("dark")).is_ok());
    assert!(registry.validate("theme", &json!(42)).is_err());
    assert!(registry.validate("visitCount", &json!(42)).is_ok());
}

#[test]
fn registry_stores_encoded_default() {
    let registry = KeyRegistry::builtin().unwrap();
    let spec = registry.get("theme").unwrap();
    assert_eq!(spec.default_value, json!("light"));
    assert!(registry.contains("prompts"));
    assert!(registry.get("missing").is_none());
}
