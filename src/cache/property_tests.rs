//! Property-Based Tests for the cache tiers
//!
//! Uses proptest to check the memory tier against a reference LRU model and
//! the disk tier round-trip.

use proptest::prelude::*;
use std::collections::HashSet;
use std::time::Duration;

use crate::cache::MemoryCache;
use crate::disk::{DiskCache, KeyValueStore, SqliteBox};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 8;
const TEST_DEFAULT_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Small key space so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-j]".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = u32> {
    any::<u32>()
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, value: u32 },
    Get { key: String },
    Remove { key: String },
    Contains { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        3 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Put { key, value }),
        3 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Remove { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Contains { key }),
    ]
}

// == Reference Model ==
/// Naive LRU: a Vec ordered oldest first.
struct ModelLru {
    max: usize,
    items: Vec<(String, u32)>,
}

impl ModelLru {
    fn put(&mut self, key: String, value: u32) {
        if let Some(pos) = self.items.iter().position(|(k, _)| *k == key) {
            self.items.remove(pos);
        } else if self.items.len() >= self.max {
            self.items.remove(0);
        }
        self.items.push((key, value));
    }

    fn get(&mut self, key: &str) -> Option<u32> {
        let pos = self.items.iter().position(|(k, _)| k == key)?;
        let item = self.items.remove(pos);
        let value = item.1;
        self.items.push(item);
        Some(value)
    }

    fn remove(&mut self, key: &str) {
        self.items.retain(|(k, _)| k != key);
    }

    fn contains(&self, key: &str) -> bool {
        self.items.iter().any(|(k, _)| k == key)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Any operation sequence behaves exactly like the reference LRU model.
    #[test]
    fn prop_matches_reference_lru(
        max in 1usize..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let mut cache = MemoryCache::with_max_size(max, TEST_DEFAULT_TTL);
        let mut model = ModelLru { max, items: Vec::new() };

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    cache.put(key.clone(), value);
                    model.put(key, value);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(key.as_str()), model.get(&key), "get({})", key);
                }
                CacheOp::Remove { key } => {
                    cache.remove(key.as_str());
                    model.remove(&key);
                }
                CacheOp::Contains { key } => {
                    prop_assert_eq!(cache.contains_key(key.as_str()), model.contains(&key));
                }
            }
            prop_assert_eq!(cache.len(), model.items.len());
        }
    }

    // The entry count never exceeds the configured capacity.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..100)
    ) {
        let mut cache = MemoryCache::with_max_size(TEST_MAX_ENTRIES / 2, TEST_DEFAULT_TTL);

        for (key, value) in entries {
            cache.put(key, value);
            prop_assert!(cache.len() <= TEST_MAX_ENTRIES / 2);
            prop_assert_eq!(cache.stats().size, cache.len());
        }
    }

    // Inserting n+1 distinct keys into a cache of n evicts exactly the first.
    #[test]
    fn prop_lru_eviction_order(
        keys in prop::collection::hash_set("[a-z]{1,8}", 2..10),
        new_key in "[A-Z]{1,8}"
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let mut cache = MemoryCache::with_max_size(keys.len(), TEST_DEFAULT_TTL);

        for (i, key) in keys.iter().enumerate() {
            cache.put(key.clone(), i);
        }
        cache.put(new_key.clone(), usize::MAX);

        prop_assert_eq!(cache.len(), keys.len());
        prop_assert!(!cache.contains_key(keys[0].as_str()));
        prop_assert!(cache.contains_key(new_key.as_str()));
        for key in keys.iter().skip(1) {
            prop_assert!(cache.contains_key(key.as_str()), "{} should survive", key);
        }
    }

    // Touching the oldest key protects it; the next oldest goes instead.
    #[test]
    fn prop_lru_access_tracking(
        keys in prop::collection::hash_set("[a-z]{1,8}", 3..10),
        new_key in "[A-Z]{1,8}"
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let mut cache = MemoryCache::with_max_size(keys.len(), TEST_DEFAULT_TTL);

        for key in &keys {
            cache.put(key.clone(), key.len());
        }
        prop_assert!(cache.get(keys[0].as_str()).is_some());
        cache.put(new_key, 0);

        prop_assert!(cache.contains_key(keys[0].as_str()));
        prop_assert!(!cache.contains_key(keys[1].as_str()));
    }

    // Re-putting present keys at capacity never evicts or changes size.
    #[test]
    fn prop_refresh_does_not_evict(
        keys in prop::collection::hash_set("[a-z]{1,8}", 1..10),
        refreshes in prop::collection::vec(any::<prop::sample::Index>(), 1..20)
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let mut cache = MemoryCache::with_max_size(keys.len(), TEST_DEFAULT_TTL);
        for key in &keys {
            cache.put(key.clone(), 0u8);
        }

        for index in refreshes {
            cache.put(index.get(&keys).clone(), 1);
            prop_assert_eq!(cache.len(), keys.len());
        }

        let present: HashSet<&String> = keys.iter().filter(|k| cache.contains_key(k.as_str())).collect();
        prop_assert_eq!(present.len(), keys.len());
    }

    // Clear leaves nothing behind.
    #[test]
    fn prop_clear_empties(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 0..30)
    ) {
        let mut cache = MemoryCache::new(TEST_DEFAULT_TTL);
        for (key, value) in &entries {
            cache.put(key.clone(), *value);
        }

        cache.clear();

        prop_assert_eq!(cache.stats().size, 0);
        for (key, _) in &entries {
            prop_assert_eq!(cache.get(key.as_str()), None);
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
struct Order {
    id: u64,
    items: Vec<String>,
    total_cents: u32,
    promo: Option<String>,
}

fn order_strategy() -> impl Strategy<Value = Order> {
    (
        any::<u64>(),
        prop::collection::vec("[a-z ]{0,12}", 0..5),
        any::<u32>(),
        prop::option::of("[A-Z0-9]{4,10}"),
    )
        .prop_map(|(id, items, total_cents, promo)| Order {
            id,
            items,
            total_cents,
            promo,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    // A serde-round-tripping value comes back from disk unchanged.
    #[test]
    fn prop_disk_round_trip(key in "[a-z0-9:_-]{1,32}", order in order_strategy()) {
        let fetched = tokio_test::block_on(async {
            let store = SqliteBox::in_memory("app_cache").into_handle();
            store.open().await.unwrap();
            let cache: DiskCache<String, Order> = DiskCache::new(store, TEST_DEFAULT_TTL);

            cache.put(&key, &order).await;
            cache.get(&key).await
        });

        prop_assert_eq!(fetched, Some(order));
    }
}
