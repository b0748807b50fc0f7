//! Service scenarios over real stores

use hanzi_aggregate::{position_key, SystemClock};
use hanzi_core::prelude::*;
use hanzi_store::{StoreLessonRepository, CUMULATIVE_CACHE, QUERY_CACHE};
use hanzi_test_utils::{kangxuan_lessons, lesson, position, seeded_store, HANLIN, KANGXUAN};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn verdicts(result: &QueryResult) -> Vec<(&str, bool)> {
    result
        .results
        .iter()
        .map(|v| (v.character.as_str(), v.is_learned))
        .collect()
}

#[tokio::test]
async fn learned_status_at_second_lesson() {
    let store = seeded_store(&kangxuan_lessons()).await;
    let service = AggregationService::from_store(store.clone(), CacheConfig::default());

    let result = service
        .query_learned_status(KANGXUAN, &position(1, 1, 2), "你我他")
        .await
        .unwrap();

    assert_eq!(verdicts(&result), vec![("你", true), ("我", true), ("他", false)]);
    assert_eq!(result.total_learned, 2);
    assert_eq!(result.total_queried, 3);
    assert_eq!(result.course_range, "康軒 1-1-1 ~ 1-1-2");

    let vocab = service.cumulative_vocabulary(&position(1, 1, 2)).await.unwrap();
    assert_eq!(vocab.character_list().collect::<Vec<_>>(), vec!["你", "好", "我"]);
    assert_eq!(store.len(CUMULATIVE_CACHE), 1);
    assert_eq!(store.len(QUERY_CACHE), 1);
}

#[tokio::test]
async fn publisher_without_curriculum_learns_nothing() {
    let store = seeded_store(&kangxuan_lessons()).await;
    let service = AggregationService::from_store(store, CacheConfig::default());
    let p = CurriculumPosition::new(HANLIN, 2, 1, 3).unwrap();

    let result = service.query_learned_status(HANLIN, &p, "你好").await.unwrap();
    assert_eq!(result.total_learned, 0);
    assert_eq!(result.total_queried, 2);
    assert!(result.results.iter().all(|v| !v.is_learned));
}

#[tokio::test]
async fn repeated_query_is_served_from_cache() {
    let store = seeded_store(&kangxuan_lessons()).await;
    let service = AggregationService::from_store(store, CacheConfig::default());
    let p = position(1, 2, 1);

    let first = service.query_learned_status(KANGXUAN, &p, "他你").await.unwrap();
    let second = service.query_learned_status(KANGXUAN, &p, "你他").await.unwrap();

    assert!(!first.cache_hit);
    assert!(second.cache_hit);
    assert_eq!(second.search_count, 2);
    assert_eq!(verdicts(&second), vec![("你", true), ("他", true)]);
}

#[tokio::test]
async fn clearing_makes_new_lessons_visible() {
    let store = seeded_store(&kangxuan_lessons()).await;
    let lessons = Arc::new(StoreLessonRepository::new(store.clone()));
    let service = AggregationService::new(
        store.clone(),
        lessons.clone(),
        Arc::new(SystemClock),
        CacheConfig::default(),
    );
    let p = position(1, 1, 2);

    let before = service.query_learned_status(KANGXUAN, &p, "山").await.unwrap();
    assert_eq!(before.total_learned, 0);

    lessons.put_lesson(&lesson(1, 1, 2, "我山")).await.unwrap();
    let stale = service.query_learned_status(KANGXUAN, &p, "山").await.unwrap();
    assert_eq!(stale.total_learned, 0, "no automatic invalidation");

    assert_eq!(service.clear_cumulative_cache(Some(&p)).await.unwrap(), 1);
    let fresh = service.query_learned_status(KANGXUAN, &p, "山").await.unwrap();
    assert_eq!(fresh.total_learned, 1);
    assert!(!fresh.cache_hit);
}

#[tokio::test]
async fn file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = LedgerConfig::new().with_store(StoreConfig::File {
        root: dir.path().to_path_buf(),
    });

    {
        let store = config.store.open();
        let lessons = StoreLessonRepository::new(store.clone());
        for record in kangxuan_lessons() {
            lessons.put_lesson(&record).await.unwrap();
        }
        let service = AggregationService::from_store(store, config.cache.clone());
        service
            .query_learned_status(KANGXUAN, &position(1, 1, 2), "你我")
            .await
            .unwrap();
    }

    let service = AggregationService::from_store(config.store.open(), config.cache.clone());
    let again = service
        .query_learned_status(KANGXUAN, &position(1, 1, 2), "我你")
        .await
        .unwrap();
    assert!(again.cache_hit);
    assert_eq!(again.search_count, 2);
    assert_eq!(again.total_learned, 2);
}

#[tokio::test]
async fn config_file_selects_backend() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("data");
    let path = dir.path().join("ledger.toml");
    std::fs::write(
        &path,
        format!(
            "[store]\nkind = \"file\"\nroot = {:?}\n\n[cache]\ncumulative_ttl_secs = 30\n",
            root.display().to_string()
        ),
    )
    .unwrap();

    let config = LedgerConfig::from_file(&path).unwrap();
    assert_eq!(config.store, StoreConfig::File { root });
    assert_eq!(config.store.open().backend_tag(), "json-file");
    assert_eq!(config.cache.cumulative_ttl_secs, Some(30));
}

#[tokio::test]
async fn store_outage_is_reported_not_guessed() {
    let store = Arc::new(MemoryStore::new());
    let service = AggregationService::from_store(store.clone(), CacheConfig::default());
    store.set_unavailable(true);

    let err = service
        .query_learned_status(KANGXUAN, &position(1, 1, 1), "你")
        .await
        .unwrap_err();
    assert!(matches!(err, AggregationError::AggregationUnavailable(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn publishers_differing_only_in_case_do_not_share_vocabulary() {
    let store = seeded_store(&[LessonRecord::new("Kang", 1, 1, 1, ["你"])]).await;
    let service = AggregationService::from_store(store, CacheConfig::default());
    let lower = CurriculumPosition::new("Kang", 1, 1, 1).unwrap();
    let upper = CurriculumPosition::new("KANG", 1, 1, 1).unwrap();

    let kang = service.query_learned_status("Kang", &lower, "你").await.unwrap();
    assert_eq!(kang.total_learned, 1);

    let other = service.query_learned_status("KANG", &upper, "你").await.unwrap();
    assert_eq!(other.total_learned, 0);
    assert_eq!(other.course_range, "KANG 1-1-1 ~ 1-1-1");
    assert_eq!(other.position, upper);
}

#[tokio::test]
async fn file_store_answers_long_queries() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path()));
    let lessons = StoreLessonRepository::new(store.clone());
    for record in kangxuan_lessons() {
        lessons.put_lesson(&record).await.unwrap();
    }
    let service = AggregationService::from_store(store, CacheConfig::default());

    let text: String = "你好"
        .chars()
        .chain((0..48u32).filter_map(|i| char::from_u32(0x5000 + i)))
        .collect();
    assert_eq!(text.chars().count(), 50);

    let first = service
        .query_learned_status(KANGXUAN, &position(1, 1, 1), &text)
        .await
        .unwrap();
    assert_eq!(first.total_queried, 50);
    assert_eq!(first.total_learned, 2);

    let again = service
        .query_learned_status(KANGXUAN, &position(1, 1, 1), &text)
        .await
        .unwrap();
    assert!(again.cache_hit);
    assert_eq!(service.clear_query_cache(Some(&position(1, 1, 1))).await.unwrap(), 1);
}

#[tokio::test]
async fn truncated_cache_file_is_rebuilt() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path()));
    let lessons = StoreLessonRepository::new(store.clone());
    for record in kangxuan_lessons() {
        lessons.put_lesson(&record).await.unwrap();
    }
    let service = AggregationService::from_store(store.clone(), CacheConfig::default());
    let p = position(1, 1, 2);
    service.cumulative_vocabulary(&p).await.unwrap();

    let path = store.document_path(CUMULATIVE_CACHE, &position_key(&p));
    std::fs::write(&path, r#"{"characters": ["#).unwrap();

    let rebuilt = service.cumulative_vocabulary(&p).await.unwrap();
    assert_eq!(rebuilt.character_list().collect::<Vec<_>>(), vec!["你", "好", "我"]);

    let result = service.query_learned_status(KANGXUAN, &p, "我他").await.unwrap();
    assert_eq!(verdicts(&result), vec![("我", true), ("他", false)]);
}
