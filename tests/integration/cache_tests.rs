//! Response cache integration tests

use crate::common::fixtures;
use crate::common::{BrokerHarness, ScriptedProvider, TestDatabase};
use ai_request_broker::config::CacheConfig;
use ai_request_broker::core::cache_manager::ResponseCache;
use ai_request_broker::core::types::{
    BrokerResponse, CachingOptions, ResponseData, ResponseMetadata,
};
use ai_request_broker::storage::BrokerStore;
use ai_request_broker::utils::{Clock, ManualClock};
use chrono::Duration;
use std::sync::Arc;

fn small_cache() -> CacheConfig {
    CacheConfig {
        default_ttl_secs: 60,
        max_size: 100,
    }
}

fn answer(request_id: &str, text: &str) -> BrokerResponse {
    BrokerResponse::success(
        request_id,
        ResponseData::Generation {
            content: text.to_string(),
        },
        ResponseMetadata {
            model_used: Some("model-a".to_string()),
            provider_used: Some("primary".to_string()),
            tokens_used: Some(30),
            cost: Some(0.01),
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn test_entry_expires_with_clock() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder()
        .provider(primary.clone(), 10)
        .cache_config(small_cache())
        .build()
        .await;

    h.broker.process(&fixtures::generation("r1")).await;

    // Generation entries live for twice the base TTL
    h.clock.advance(Duration::seconds(119));
    assert!(h.broker.process(&fixtures::generation("r2")).await.metadata.cached);

    h.clock.advance(Duration::seconds(2));
    let response = h.broker.process(&fixtures::generation("r3")).await;
    assert!(!response.metadata.cached);
    assert_eq!(primary.calls(), 2);
}

#[tokio::test]
async fn test_request_ttl_overrides_default() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder()
        .provider(primary.clone(), 10)
        .cache_config(small_cache())
        .build()
        .await;

    let short = |id: &str| fixtures::generation(id).with_caching(fixtures::caching_ttl(5));
    h.broker.process(&short("r1")).await;
    h.clock.advance(Duration::seconds(6));

    assert!(!h.broker.process(&short("r2")).await.metadata.cached);
    assert_eq!(primary.calls(), 2);
}

#[tokio::test]
async fn test_caching_disabled_per_request() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder().provider(primary.clone(), 10).build().await;

    let uncached = |id: &str| {
        fixtures::generation(id).with_caching(CachingOptions {
            enabled: false,
            ..Default::default()
        })
    };
    h.broker.process(&uncached("r1")).await;
    h.broker.process(&uncached("r2")).await;
    assert_eq!(primary.calls(), 2);
    assert_eq!(h.cache.stats().writes, 0);
}

#[tokio::test]
async fn test_different_topics_do_not_collide() {
    let primary = ScriptedProvider::new("primary");
    let h = BrokerHarness::builder().provider(primary.clone(), 10).build().await;

    h.broker
        .process(&fixtures::generation_about("r1", "Volcanoes"))
        .await;
    let response = h
        .broker
        .process(&fixtures::generation_about("r2", "Glaciers"))
        .await;
    assert!(!response.metadata.cached);
    assert_eq!(primary.calls(), 2);
}

#[tokio::test]
async fn test_database_backed_cache() {
    let db = TestDatabase::new().await;
    let store: Arc<dyn BrokerStore> = db.db_arc();
    let clock = Arc::new(ManualClock::default());
    let dyn_clock: Arc<dyn Clock> = clock.clone();
    let cache = ResponseCache::new(store.clone(), small_cache()).with_clock(dyn_clock);

    let request = fixtures::generation("r1");
    assert!(cache.get(&request).await.is_none());

    cache.set(&request, &answer("r1", "first")).await;
    let hit = cache.get(&request).await.expect("cached");
    assert_eq!(hit.data.text(), "first");
    assert_eq!(hit.tokens_used, Some(30));
    assert_eq!(hit.provider_used.as_deref(), Some("primary"));
    assert_eq!(hit.hit_count, 1);

    let hit = cache.get(&request).await.expect("cached");
    assert_eq!(hit.hit_count, 2);

    // A second set for the same fingerprint replaces the first
    cache.set(&request, &answer("r1", "second")).await;
    assert_eq!(cache.get(&request).await.unwrap().data.text(), "second");
    assert_eq!(store.count_cache_entries().await.unwrap(), 1);

    clock.advance(Duration::seconds(121));
    assert!(cache.get(&request).await.is_none());
    assert_eq!(store.count_cache_entries().await.unwrap(), 0);
}

#[tokio::test]
async fn test_database_eviction_keeps_size_bounded() {
    let db = TestDatabase::new().await;
    let store: Arc<dyn BrokerStore> = db.db_arc();
    let clock = Arc::new(ManualClock::default());
    let dyn_clock: Arc<dyn Clock> = clock.clone();
    let cache = ResponseCache::new(
        store.clone(),
        CacheConfig {
            default_ttl_secs: 60,
            max_size: 5,
        },
    )
    .with_clock(dyn_clock);

    for i in 0..12 {
        let request = fixtures::generation_about(&format!("r{}", i), &format!("topic {}", i));
        cache.set(&request, &answer("r", "text")).await;
        clock.advance(Duration::seconds(1));
    }

    assert!(store.count_cache_entries().await.unwrap() <= 5);
    assert!(cache.stats().evictions > 0);

    // The newest entry survives eviction
    let newest = fixtures::generation_about("r11", "topic 11");
    assert!(cache.get(&newest).await.is_some());
    let oldest = fixtures::generation_about("r0", "topic 0");
    assert!(cache.get(&oldest).await.is_none());

    let remaining = store.count_cache_entries().await.unwrap();
    assert_eq!(cache.clear().await, remaining);
    assert_eq!(store.count_cache_entries().await.unwrap(), 0);
}
