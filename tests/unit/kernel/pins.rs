use super::*;
use std::sync::Mutex as StdMutex;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

#[test]
fn toggle_reports_new_state() {
    let mut pins = PinStore::in_memory();
    assert!(pins.toggle("demo-1"));
    assert!(pins.contains("demo-1"));
    assert!(!pins.toggle("demo-1"));
    assert!(pins.is_empty());
}

#[test]
fn persist_then_hydrate_round_trips_through_storage() {
    let storage: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    block_on(async {
        let mut pins = PinStore::new(storage.clone());
        pins.pin("a");
        pins.pin("b");
        assert!(pins.is_dirty());
        pins.persist().await.unwrap();
        assert!(!pins.is_dirty());

        let mut restored = PinStore::new(storage.clone());
        assert!(!restored.is_ready());
        restored.pin("c");
        restored.hydrate().await.unwrap();
        assert!(restored.is_ready());
        assert_eq!(restored.ids(), ["a", "b", "c"].map(String::from));
    });
}

#[test]
fn emit_hands_out_copies() {
    let mut pins = PinStore::in_memory();
    let seen = Arc::new(StdMutex::new(Vec::new()));
    let sink = seen.clone();
    let subscription = pins.subscribe(Box::new(move |ids| sink.lock().unwrap().push(ids)));

    pins.pin("a");
    pins.emit();
    assert!(pins.unsubscribe(subscription));
    pins.pin("b");
    pins.emit();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].is_empty());
    assert_eq!(seen[1], vec!["a".to_string()]);
}

#[test]
fn prune_removes_rejected_ids() {
    let mut pins = PinStore::in_memory();
    pins.pin("keep");
    pins.pin("drop");
    assert_eq!(pins.prune(|id| id == "keep"), 1);
    assert_eq!(pins.ids(), ["keep".to_string()]);
}
