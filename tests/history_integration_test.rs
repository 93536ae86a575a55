use parcel_track::app::display::render_history;
use parcel_track::HistoryStore;
use tempfile::TempDir;

#[tokio::test]
async fn test_history_survives_reopening() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data").join("history.json");

    let store = HistoryStore::at_path(&path);
    assert!(store.load().await.unwrap().is_empty());
    assert!(store.add("7401234567", "acs").await.unwrap());
    assert!(store.add("RE123456789GR", "elta").await.unwrap());
    assert!(store.rename("RE123456789GR", "books").await.unwrap());

    assert!(path.exists());

    let reopened = HistoryStore::at_path(&path);
    let entries = reopened.load().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].alias, "books");

    assert!(reopened.remove("7401234567").await.unwrap());
    let table = render_history(&reopened.load().await.unwrap());
    assert!(table.contains("RE123456789GR"));
    assert!(!table.contains("7401234567"));
}

#[tokio::test]
async fn test_history_file_is_plain_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("history.json");

    let store = HistoryStore::at_path(&path);
    store.add("SL00012345", "skroutz").await.unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["tracking_number"], "SL00012345");
    assert_eq!(value[0]["courier"], "skroutz");
    assert_eq!(value[0]["alias"], "");
}
