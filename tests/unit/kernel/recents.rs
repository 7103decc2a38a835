use super::*;
use crate::kernel::services::ports::MemoryStore;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn store() -> RecentStore {
    RecentStore::new(Arc::new(MemoryStore::new()))
}

#[test]
fn record_moves_to_front_and_dedupes() {
    let mut recents = store();
    block_on(async {
        recents.record("a").await.unwrap();
        recents.record("b").await.unwrap();
        recents.record("a").await.unwrap();
    });
    assert_eq!(recents.ids(), ["a", "b"].map(String::from));
    assert_eq!(recents.rank_of("a"), Some(0));
    assert_eq!(recents.rank_of("b"), Some(1));
    assert_eq!(recents.rank_of("c"), None);
}

#[test]
fn list_is_capped_at_ten() {
    let mut recents = store();
    block_on(async {
        for i in 0..15 {
            recents.record(&format!("cmd-{i}")).await.unwrap();
        }
    });
    assert_eq!(recents.ids().len(), 10);
    assert_eq!(recents.ids()[0], "cmd-14");
    assert_eq!(recents.ids()[9], "cmd-5");
}

#[test]
fn rerun_last_is_never_recorded_or_returned() {
    let mut recents = store();
    block_on(async {
        recents.record("a").await.unwrap();
        recents.record(RERUN_LAST_COMMAND_ID).await.unwrap();
    });
    assert_eq!(recents.ids(), ["a".to_string()]);
    assert_eq!(recents.newest(None), Some("a"));
    assert_eq!(recents.newest(Some("a")), None);
}

#[test]
fn newest_skips_the_excluded_id() {
    let mut recents = store();
    block_on(async {
        recents.record("a").await.unwrap();
        recents.record("b").await.unwrap();
    });
    assert_eq!(recents.newest(Some("b")), Some("a"));
}

#[test]
fn hydrate_filters_skip_set_and_duplicates() {
    let storage = Arc::new(MemoryStore::new());
    block_on(async {
        save_json(
            storage.as_ref(),
            RECENT_COMMANDS_KEY,
            &vec!["a", RERUN_LAST_COMMAND_ID, "a", "b"],
        )
        .await
        .unwrap();

        let mut recents = RecentStore::new(storage.clone());
        recents.hydrate().await.unwrap();
        assert_eq!(recents.ids(), ["a", "b"].map(String::from));
    });
}
