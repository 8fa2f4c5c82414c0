use std::sync::Arc;

use repwatch_monitor::{
    default_known_entries, CrawledRepresentative, KnownEntry, KnownListError, KnownListManager,
    MonitorConfig,
};
use repwatch_nullables::{NullCrawler, NullKvStore};
use repwatch_store::KvStore;
use repwatch_types::{derive_address, RepAddress, DEFAULT_PREFIX};

const STORE_KEY: &str = "banvault-representatives";
const LEGACY_KEY: &str = "nanovault-representatives";

fn rep(n: u8) -> RepAddress {
    derive_address(&[n; 32], DEFAULT_PREFIX)
}

fn manager(store: &Arc<NullKvStore>) -> KnownListManager<Arc<NullKvStore>> {
    KnownListManager::new(store.clone(), &MonitorConfig::default())
}

fn stored(store: &NullKvStore) -> Vec<KnownEntry> {
    serde_json::from_str(&store.raw(STORE_KEY).expect("list stored")).expect("valid json")
}

#[tokio::test]
async fn nothing_stored_and_no_crawler_gives_defaults() {
    let store = Arc::new(NullKvStore::new());
    let mut known = manager(&store);

    let list = known.load(&NullCrawler::default()).await.unwrap().to_vec();

    assert_eq!(list, default_known_entries());
    assert!(known.is_loaded());
    // Defaults are never written back.
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn save_then_load_round_trips() {
    let store = Arc::new(NullKvStore::new());
    let entry = KnownEntry::new(rep(1), "Mine").warn(true);
    {
        let mut known = manager(&store);
        known.load(&NullCrawler::default()).await.unwrap();
        known.save(entry.clone()).unwrap();
    }

    let mut reloaded = manager(&store);
    let list = reloaded.load(&NullCrawler::default()).await.unwrap();

    assert!(list.contains(&entry));
    assert_eq!(list.len(), default_known_entries().len() + 1);
}

#[tokio::test]
async fn delete_then_load_excludes_entry() {
    let store = Arc::new(NullKvStore::new());
    {
        let mut known = manager(&store);
        known.load(&NullCrawler::default()).await.unwrap();
        known.save(KnownEntry::new(rep(1), "Mine")).unwrap();
        assert!(known.delete(&rep(1).as_str().to_ascii_uppercase()).unwrap());
        assert!(!known.delete(rep(1).as_str()).unwrap());
    }

    let mut reloaded = manager(&store);
    let list = reloaded.load(&NullCrawler::default()).await.unwrap();
    assert!(list.iter().all(|e| e.id != rep(1)));
}

#[tokio::test]
async fn save_replaces_by_name_or_id_ignoring_case() {
    let store = Arc::new(NullKvStore::new().with_value(STORE_KEY, "[]"));
    let mut known = manager(&store);
    known.load(&NullCrawler::default()).await.unwrap();

    known.save(KnownEntry::new(rep(1), "Alpha")).unwrap();
    known.save(KnownEntry::new(rep(2), "Beta")).unwrap();
    // Same name, different case: replaces Alpha in place.
    known.save(KnownEntry::new(rep(3), "ALPHA").trusted(true)).unwrap();
    // Same id: replaces Beta in place.
    known.save(KnownEntry::new(rep(2), "Gamma")).unwrap();

    let expected = vec![
        KnownEntry::new(rep(3), "ALPHA").trusted(true),
        KnownEntry::new(rep(2), "Gamma"),
    ];
    assert_eq!(known.entries(), expected.as_slice());
    assert_eq!(stored(&store), expected);
}

#[tokio::test]
async fn name_exists_ignores_case() {
    let store = Arc::new(NullKvStore::new().with_value(STORE_KEY, "[]"));
    let mut known = manager(&store);
    known.load(&NullCrawler::default()).await.unwrap();
    known.save(KnownEntry::new(rep(1), "My Node")).unwrap();

    assert!(known.name_exists("my node"));
    assert!(known.name_exists("MY NODE"));
    assert!(!known.name_exists("other"));
}

#[tokio::test]
async fn non_ascii_names_match_ignoring_case() {
    let store = Arc::new(NullKvStore::new().with_value(STORE_KEY, "[]"));
    let mut known = manager(&store);
    known.load(&NullCrawler::default()).await.unwrap();

    known.save(KnownEntry::new(rep(1), "Éclair")).unwrap();
    assert!(known.name_exists("éclair"));
    assert!(known.name_exists("ÉCLAIR"));

    // Same label in another case replaces the entry instead of duplicating it.
    known.save(KnownEntry::new(rep(2), "éclair")).unwrap();
    assert_eq!(known.entries(), [KnownEntry::new(rep(2), "éclair")].as_slice());
    assert_eq!(stored(&store), vec![KnownEntry::new(rep(2), "éclair")]);
}

#[tokio::test]
async fn legacy_key_is_migrated_once() {
    let legacy = format!(r#"[{{"id":"{}","name":"Old"}}]"#, rep(1));
    let store = Arc::new(NullKvStore::new().with_value(LEGACY_KEY, &legacy));
    let mut known = manager(&store);

    let list = known.load(&NullCrawler::default()).await.unwrap().to_vec();

    assert_eq!(list, vec![KnownEntry::new(rep(1), "Old")]);
    assert_eq!(store.raw(STORE_KEY), Some(legacy));
    assert_eq!(store.raw(LEGACY_KEY), None);
}

#[tokio::test]
async fn current_key_wins_over_legacy_key() {
    let current = format!(r#"[{{"id":"{}","name":"New"}}]"#, rep(2));
    let legacy = format!(r#"[{{"id":"{}","name":"Old"}}]"#, rep(1));
    let store = Arc::new(
        NullKvStore::new()
            .with_value(STORE_KEY, &current)
            .with_value(LEGACY_KEY, &legacy),
    );
    let mut known = manager(&store);

    let list = known.load(&NullCrawler::default()).await.unwrap().to_vec();

    assert_eq!(list, vec![KnownEntry::new(rep(2), "New")]);
    assert_eq!(store.raw(STORE_KEY), Some(current));
    assert_eq!(store.raw(LEGACY_KEY), None);
}

#[tokio::test]
async fn malformed_current_list_keeps_legacy_key() {
    let legacy = format!(r#"[{{"id":"{}","name":"Old"}}]"#, rep(1));
    let store = Arc::new(
        NullKvStore::new()
            .with_value(STORE_KEY, "not a list")
            .with_value(LEGACY_KEY, &legacy),
    );
    let mut known = manager(&store);

    assert!(matches!(
        known.load(&NullCrawler::default()).await,
        Err(KnownListError::Parse(_))
    ));
    assert_eq!(store.raw(LEGACY_KEY), Some(legacy));
}

#[tokio::test]
async fn crawler_seeds_when_nothing_is_stored() {
    let store = Arc::new(NullKvStore::new());
    let crawler = NullCrawler::new(vec![
        CrawledRepresentative {
            address: derive_address(&[1; 32], "nano_"),
            online: true,
        },
        CrawledRepresentative {
            address: rep(2),
            online: false,
        },
        CrawledRepresentative {
            address: RepAddress::new("ban_broken"),
            online: true,
        },
    ]);
    let mut known = manager(&store);

    let list = known.load(&crawler).await.unwrap().to_vec();

    assert_eq!(
        list,
        vec![
            KnownEntry::new(rep(1), rep(1).short_label()).trusted(true),
            KnownEntry::new(rep(2), rep(2).short_label()),
        ]
    );
    assert_eq!(crawler.requests(), vec![(100_000, true)]);
    // Seeding never persists.
    assert_eq!(store.raw(STORE_KEY), None);

    // Reset reverts to the crawler-derived list, not the shipped one.
    known.reset().unwrap();
    assert_eq!(known.entries(), list.as_slice());
}

#[tokio::test]
async fn crawler_is_not_consulted_when_a_list_is_stored() {
    let store = Arc::new(NullKvStore::new().with_value(STORE_KEY, "[]"));
    let crawler = NullCrawler::with_reps(&[(rep(1).as_str(), true)]);
    let mut known = manager(&store);

    assert!(known.load(&crawler).await.unwrap().is_empty());
    assert!(crawler.requests().is_empty());
}

#[tokio::test]
async fn bootstrap_never_replaces_a_stored_list() {
    let store = Arc::new(NullKvStore::new().with_value(STORE_KEY, "[]"));
    let crawler = NullCrawler::with_reps(&[(rep(1).as_str(), true)]);
    let mut known = manager(&store);
    known.load(&crawler).await.unwrap();

    assert!(known.bootstrap_from_crawler(&crawler).await.unwrap());

    assert!(known.entries().is_empty());
    assert_eq!(store.raw(STORE_KEY).as_deref(), Some("[]"));
}

#[tokio::test]
async fn crawler_failure_keeps_defaults() {
    let store = Arc::new(NullKvStore::new());
    let crawler = NullCrawler::failing(repwatch_monitor::SourceError::Unreachable("down".into()));
    let mut known = manager(&store);

    let list = known.load(&crawler).await.unwrap().to_vec();
    assert_eq!(list, default_known_entries());
}

#[tokio::test]
async fn reset_clears_store_and_reloads() {
    let store = Arc::new(NullKvStore::new());
    let mut known = manager(&store);
    known.load(&NullCrawler::default()).await.unwrap();
    known.save(KnownEntry::new(rep(1), "Mine")).unwrap();
    assert!(store.raw(STORE_KEY).is_some());

    known.reset().unwrap();

    assert_eq!(store.raw(STORE_KEY), None);
    assert!(!known.is_loaded());
    assert_eq!(known.entries(), default_known_entries().as_slice());

    let crawler = NullCrawler::with_reps(&[(rep(5).as_str(), false)]);
    let list = known.load(&crawler).await.unwrap().to_vec();
    assert_eq!(list, vec![KnownEntry::new(rep(5), rep(5).short_label())]);
}

#[tokio::test]
async fn malformed_stored_list_is_a_parse_error() {
    let store = Arc::new(NullKvStore::new().with_value(STORE_KEY, "{not json"));
    let mut known = manager(&store);

    let err = known.load(&NullCrawler::default()).await.unwrap_err();

    assert!(matches!(err, KnownListError::Parse(_)));
    assert!(!known.is_loaded());

    known.reset().unwrap();
    assert!(known.load(&NullCrawler::default()).await.is_ok());
}

#[tokio::test]
async fn store_failure_on_save_is_reported() {
    let store = Arc::new(NullKvStore::new());
    let mut known = manager(&store);
    known.load(&NullCrawler::default()).await.unwrap();
    store.fail_writes(true);

    assert!(matches!(
        known.save(KnownEntry::new(rep(1), "Mine")),
        Err(KnownListError::Store(_))
    ));
}

#[tokio::test]
async fn legacy_prefixes_are_rewritten_in_store() {
    let list = format!(
        r#"[{{"id":"{}","name":"A"}},{{"id":"{}","name":"B","trusted":true}},{{"id":"{}","name":"C"}}]"#,
        derive_address(&[1; 32], "xrb_"),
        derive_address(&[2; 32], "nano_"),
        rep(3),
    );
    let store = Arc::new(NullKvStore::new().with_value(STORE_KEY, &list));
    let mut known = manager(&store);
    known.load(&NullCrawler::default()).await.unwrap();

    assert!(known.migrate_legacy_prefixes().unwrap());

    let expected = vec![
        KnownEntry::new(rep(1), "A"),
        KnownEntry::new(rep(2), "B").trusted(true),
        KnownEntry::new(rep(3), "C"),
    ];
    assert_eq!(stored(&store), expected);
    assert_eq!(known.entries(), expected.as_slice());
    assert!(known.get(&rep(2)).is_some_and(|e| e.trusted));
}

#[tokio::test]
async fn prefix_migration_without_stored_list_is_a_no_op() {
    let store = Arc::new(NullKvStore::new());
    let mut known = manager(&store);
    assert!(!known.migrate_legacy_prefixes().unwrap());
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn sorted_by_priority_is_stable() {
    let store = Arc::new(NullKvStore::new().with_value(STORE_KEY, "[]"));
    let mut known = manager(&store);
    known.load(&NullCrawler::default()).await.unwrap();
    known.save(KnownEntry::new(rep(1), "plain-1")).unwrap();
    known.save(KnownEntry::new(rep(2), "warned").warn(true)).unwrap();
    known.save(KnownEntry::new(rep(3), "trusted-1").trusted(true)).unwrap();
    known.save(KnownEntry::new(rep(4), "plain-2")).unwrap();
    known.save(KnownEntry::new(rep(5), "trusted-2").trusted(true)).unwrap();

    let names: Vec<_> = known
        .sorted_by_priority()
        .into_iter()
        .map(|e| e.name)
        .collect();

    assert_eq!(names, ["trusted-1", "trusted-2", "plain-1", "plain-2", "warned"]);
    // Display ordering does not touch the stored order.
    assert_eq!(known.entries()[0].name, "plain-1");
}

#[tokio::test]
async fn every_mutation_is_published() {
    let store = Arc::new(NullKvStore::new());
    let mut known = manager(&store);
    let mut rx = known.subscribe();

    known.load(&NullCrawler::default()).await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().len(), 11);

    known.save(KnownEntry::new(rep(1), "Mine")).unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().len(), 12);

    known.delete(rep(1).as_str()).unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().len(), 11);

    known.reset().unwrap();
    assert!(rx.has_changed().unwrap());
}

#[tokio::test]
async fn stored_json_omits_false_flags() {
    let store = Arc::new(NullKvStore::new().with_value(STORE_KEY, "[]"));
    let mut known = manager(&store);
    known.load(&NullCrawler::default()).await.unwrap();
    known.save(KnownEntry::new("ban_x", "X")).unwrap();

    assert_eq!(
        store.get(STORE_KEY).unwrap().as_deref(),
        Some(r#"[{"id":"ban_x","name":"X"}]"#)
    );
}
