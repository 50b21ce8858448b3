use std::sync::Arc;

use serde_json::json;

use super::*;

fn editor_in(dir: &tempfile::TempDir) -> (DeviceConfigEditor, JsonFileStore) {
    let store = JsonFileStore::new(dir.path().join("device_config.json"));
    (DeviceConfigEditor::new(Arc::new(store.clone())), store)
}

#[test]
fn test_validate_entity_id() {
    assert!(validate_entity_id("light.kitchen").is_ok());
    assert!(validate_entity_id("sensor.yr_temperature_2").is_ok());

    for bad in ["hello_world", "light.", ".kitchen", "Light.kitchen", "light.kit-chen", "a.b.c"] {
        let err = validate_entity_id(bad).unwrap_err();
        assert!(matches!(err, DeviceConfigError::InvalidKey(_)), "{bad}");
        assert!(err.to_string().starts_with("Key malformed: "));
    }
}

#[test]
fn test_validate_options_accepts_known_values() {
    for body in [
        json!({}),
        json!({"polling_intensity": 2}),
        json!({"polling_intensity": "3"}),
        json!({"polling_intensity": 0}),
        json!({"ignored": true}),
        json!({"ignored": "off"}),
        json!({"ignored": 1, "polling_intensity": 5}),
    ] {
        assert!(validate_options(&body).is_ok(), "{body}");
    }
}

#[test]
fn test_validate_options_rejects() {
    for body in [
        json!([1, 2]),
        json!("text"),
        json!({"invalid_config": 2}),
        json!({"polling_intensity": -1}),
        json!({"polling_intensity": "two"}),
        json!({"ignored": "maybe"}),
        json!({"ignored": null}),
    ] {
        let err = validate_options(&body).unwrap_err();
        assert!(err.to_string().starts_with("Message malformed: "), "{body}");
    }
}

#[test]
fn test_merge_keeps_other_keys() {
    let mut config = json!({
        "hello.beer": {"ignored": true},
        "other.entity": {"polling_intensity": 2}
    })
    .as_object()
    .cloned()
    .unwrap();

    let options = json!({"polling_intensity": 2}).as_object().cloned().unwrap();
    merge_entity(&mut config, "hello.beer", &options);
    merge_entity(&mut config, "new.entity", &options);

    assert_eq!(
        Value::Object(config),
        json!({
            "hello.beer": {"ignored": true, "polling_intensity": 2},
            "other.entity": {"polling_intensity": 2},
            "new.entity": {"polling_intensity": 2}
        })
    );
}

#[tokio::test]
async fn test_store_missing_file_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("absent.json"));
    assert!(store.read().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_store_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("device_config.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = JsonFileStore::new(&path).read().await.unwrap_err();
    assert!(matches!(err, DeviceConfigError::Serialization(_)));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_get_absent_entity() {
    let dir = tempfile::tempdir().unwrap();
    let (editor, _) = editor_in(&dir);
    assert_eq!(editor.get("light.kitchen").await.unwrap(), json!({}));
}

#[tokio::test]
async fn test_update_then_get() {
    let dir = tempfile::tempdir().unwrap();
    let (editor, store) = editor_in(&dir);

    editor
        .update("hello.beer", br#"{"ignored": true}"#)
        .await
        .unwrap();
    editor
        .update("hello.beer", br#"{"polling_intensity": 2}"#)
        .await
        .unwrap();

    assert_eq!(
        editor.get("hello.beer").await.unwrap(),
        json!({"ignored": true, "polling_intensity": 2})
    );
    assert_eq!(store.read().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_stores_raw_values() {
    let dir = tempfile::tempdir().unwrap();
    let (editor, _) = editor_in(&dir);

    editor
        .update("hello.beer", br#"{"polling_intensity": "4"}"#)
        .await
        .unwrap();
    assert_eq!(
        editor.get("hello.beer").await.unwrap(),
        json!({"polling_intensity": "4"})
    );
}

#[tokio::test]
async fn test_update_check_order() {
    let dir = tempfile::tempdir().unwrap();
    let (editor, store) = editor_in(&dir);

    // Bad JSON is reported before a bad key.
    let err = editor.update("hello_world", b"not json").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid JSON specified");

    // Bad key is reported before bad data.
    let err = editor
        .update("hello_world", br#"{"invalid_config": 2}"#)
        .await
        .unwrap_err();
    assert!(matches!(err, DeviceConfigError::InvalidKey(_)));

    let err = editor
        .update("hello.beer", br#"{"invalid_config": 2}"#)
        .await
        .unwrap_err();
    assert!(matches!(err, DeviceConfigError::InvalidData(_)));
    assert!(err.is_client_error());

    assert!(store.read().await.unwrap().is_empty());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_concurrent_updates_all_land() {
    let dir = tempfile::tempdir().unwrap();
    let (editor, store) = editor_in(&dir);
    let editor = Arc::new(editor);

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let editor = editor.clone();
            tokio::spawn(async move {
                let entity = format!("light.lamp_{}", i);
                editor
                    .update(&entity, br#"{"polling_intensity": 1}"#)
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(store.read().await.unwrap().len(), 8);
}
