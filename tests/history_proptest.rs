//! Property tests for the history cache invariants: the list is always
//! bounded by the capacity cap, ordered most-recent-first, and loading
//! tolerates arbitrary persisted garbage.

use proptest::prelude::*;

use app_lib::db::models::GenerationRecord;
use app_lib::db::repos::{history, settings};
use app_lib::db::{migrations, DbPool};

fn test_pool() -> DbPool {
    let tmp = std::env::temp_dir().join(format!("artstudio_prop_{}.db", uuid::Uuid::new_v4()));
    let manager = r2d2_sqlite::SqliteConnectionManager::file(&tmp);
    let pool = r2d2::Pool::builder().max_size(2).build(manager).unwrap();
    migrations::run(&pool.get().unwrap()).unwrap();
    pool
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn history_is_bounded_and_most_recent_first(count in 1usize..24) {
        let pool = test_pool();
        let mut inserted_ids = Vec::new();

        for n in 0..count {
            let record = GenerationRecord::new(
                format!("data:image/png;base64,orig{n}"),
                format!("data:image/png;base64,result{n}"),
                "随机".into(),
            );
            inserted_ids.push(record.id.clone());
            let list = history::record(&pool, record).unwrap();
            prop_assert!(list.len() <= history::MAX_HISTORY);
        }

        let list = history::load(&pool).unwrap();
        prop_assert_eq!(list.len(), count.min(history::MAX_HISTORY));

        // Head is the last insertion, tail the oldest retained
        for (i, record) in list.iter().enumerate() {
            prop_assert_eq!(&record.id, &inserted_ids[count - 1 - i]);
        }
    }

    #[test]
    fn arbitrary_persisted_payload_never_fails_to_load(garbage in "\\PC{0,64}") {
        let pool = test_pool();
        settings::set(&pool, "generation_history", &garbage).unwrap();

        // Either the payload happens to parse as a record list or it is
        // discarded; loading must never return an error.
        let loaded = history::load(&pool);
        prop_assert!(loaded.is_ok());
    }
}
