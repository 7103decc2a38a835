use super::*;
use crate::kernel::services::ports::MemoryStore;
use serde_json::json;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

#[test]
fn actions_use_a_type_tag() {
    let def: CustomCommandDef = serde_json::from_value(json!({
        "id": "custom-morning",
        "label": "Morning routine",
        "showConfirmation": true,
        "action": { "type": "macro", "steps": ["custom-a", "mark-all-read"] }
    }))
    .unwrap();
    assert!(def.show_confirmation);
    assert_eq!(
        def.action,
        CustomAction::Macro {
            steps: vec!["custom-a".to_string(), "mark-all-read".to_string()]
        }
    );

    let url = serde_json::to_value(CustomAction::Url {
        url: "https://example.com".to_string(),
        open_external: true,
    })
    .unwrap();
    assert_eq!(
        url,
        json!({ "type": "url", "url": "https://example.com", "openExternal": true })
    );

    let command = serde_json::to_value(CustomAction::Command {
        command_id: "toggle-theme".to_string(),
    })
    .unwrap();
    assert_eq!(command, json!({ "type": "command", "commandId": "toggle-theme" }));
}

#[test]
fn validation_rejects_bad_definitions() {
    let empty_macro = CustomCommandDef::new("m", "Macro", CustomAction::Macro { steps: vec![] });
    assert!(matches!(
        empty_macro.validate(),
        Err(ValidationError::MissingField { .. })
    ));

    let bad_url = CustomCommandDef::new(
        "u",
        "Docs",
        CustomAction::Url {
            url: "not a url".to_string(),
            open_external: false,
        },
    );
    assert!(matches!(
        bad_url.validate(),
        Err(ValidationError::MalformedUrl { .. })
    ));
}

#[test]
fn upsert_prefixes_ids_and_replaces() {
    let mut store = CustomCommandStore::new(Arc::new(MemoryStore::new()));
    let first = store
        .upsert(CustomCommandDef::new(
            "docs",
            "Docs",
            CustomAction::Settings {
                route: "appearance".to_string(),
            },
        ))
        .unwrap();
    assert_eq!(first.id, "custom-docs");

    store
        .upsert(CustomCommandDef::new(
            "custom-docs",
            "Docs v2",
            CustomAction::Settings {
                route: "appearance".to_string(),
            },
        ))
        .unwrap();
    assert_eq!(store.list().len(), 1);
    assert_eq!(store.get("custom-docs").unwrap().label, "Docs v2");
}

#[test]
fn to_command_lands_in_custom_category() {
    let mut def = CustomCommandDef::new(
        "custom-x",
        "X",
        CustomAction::Command {
            command_id: "y".to_string(),
        },
    );
    def.show_confirmation = true;
    let command = def.to_command();
    assert_eq!(command.category_id, CUSTOM_CATEGORY_ID);
    assert_eq!(command.tags, vec![CUSTOM_TAG]);
    assert!(command.danger);
    assert!(command.handler.is_none());
}

#[test]
fn persist_and_hydrate_skip_malformed_entries() {
    let storage = Arc::new(MemoryStore::new());
    block_on(async {
        save_json(
            storage.as_ref(),
            CUSTOM_COMMANDS_KEY,
            &json!([
                { "id": "a", "label": "A", "action": { "type": "settings", "route": "voice" } },
                { "id": "broken" }
            ]),
        )
        .await
        .unwrap();

        let mut store = CustomCommandStore::new(storage.clone());
        store.hydrate().await.unwrap();
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.list()[0].id, "custom-a");

        store.persist().await.unwrap();
        let saved = storage.snapshot(CUSTOM_COMMANDS_KEY).unwrap();
        assert_eq!(saved[0]["id"], "custom-a");
    });
}
