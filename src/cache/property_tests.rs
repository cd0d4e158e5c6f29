//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the facade against a plain `HashMap` model.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::cache::Cache;
use crate::tasks::update_fn;

// == Strategies ==
/// Generates cache keys from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-d]{1,2}".prop_map(|s| s)
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Store { key: String, value: u32 },
    Replace { key: String, value: u32 },
    Remove { key: String },
    Get { key: String },
    Clear,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), any::<u32>()).prop_map(|(key, value)| CacheOp::Store { key, value }),
        3 => (key_strategy(), any::<u32>()).prop_map(|(key, value)| CacheOp::Replace { key, value }),
        2 => key_strategy().prop_map(|key| CacheOp::Remove { key }),
        3 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => Just(CacheOp::Clear),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // *For any* sequence of permanent-entry operations, every result and the
    // final key set SHALL match a HashMap given the same sequence.
    #[test]
    fn prop_matches_hashmap_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        runtime().block_on(async {
            let cache: Cache<String, u32> = Cache::new();
            let mut model: HashMap<String, u32> = HashMap::new();

            for op in ops {
                match op {
                    CacheOp::Store { key, value } => {
                        let result = cache.store(key.clone(), value).await;
                        if model.contains_key(&key) {
                            prop_assert!(result.unwrap_err().is_already_exists());
                        } else {
                            prop_assert!(result.is_ok());
                            model.insert(key, value);
                        }
                    }
                    CacheOp::Replace { key, value } => {
                        let result = cache.replace(key.clone(), value).await;
                        if let Some(slot) = model.get_mut(&key) {
                            prop_assert!(result.is_ok());
                            *slot = value;
                        } else {
                            prop_assert!(result.unwrap_err().is_does_not_exist());
                        }
                    }
                    CacheOp::Remove { key } => {
                        let result = cache.remove(&key).await;
                        prop_assert_eq!(result.is_ok(), model.remove(&key).is_some());
                    }
                    CacheOp::Get { key } => {
                        let result = cache.get(&key).await.ok();
                        prop_assert_eq!(result, model.get(&key).copied());
                    }
                    CacheOp::Clear => {
                        cache.clear().await;
                        model.clear();
                    }
                }
            }

            let keys: HashSet<String> = cache.keys().await.into_iter().collect();
            let expected: HashSet<String> = model.keys().cloned().collect();
            prop_assert_eq!(keys, expected);
            prop_assert_eq!(cache.len().await, model.len());
            Ok::<(), TestCaseError>(())
        })?;
    }

    // *For any* sequence of operations on one key, each new incarnation of the
    // key SHALL carry a strictly greater generation than every earlier one.
    #[test]
    fn prop_generations_strictly_increase(ops in prop::collection::vec(0u8..4, 1..40)) {
        runtime().block_on(async {
            let cache: Cache<String, u32> = Cache::new();
            let key = "k".to_string();
            let mut last_generation = 0;

            for op in ops {
                let installed = match op {
                    0 => cache.store(key.clone(), 1).await.is_ok(),
                    1 => cache.replace(key.clone(), 2).await.is_ok(),
                    2 => cache.expire(&key, Duration::from_secs(3600)).await.is_ok(),
                    _ => {
                        let _ = cache.remove(&key).await;
                        false
                    }
                };

                if installed {
                    let generation = cache.describe(&key).await.unwrap().generation;
                    prop_assert!(generation > last_generation);
                    last_generation = generation;
                }
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    // *For any* rejected call, the cache SHALL be left exactly as it was.
    #[test]
    fn prop_rejected_calls_change_nothing(key in key_strategy(), value in any::<u32>(), present in any::<bool>()) {
        runtime().block_on(async {
            let cache: Cache<String, u32> = Cache::new();
            if present {
                cache.store(key.clone(), value).await.unwrap();
            }
            let before = cache.describe(&key).await.ok();

            prop_assert!(cache
                .store_with_expiration(key.clone(), 0, Duration::ZERO)
                .await
                .unwrap_err()
                .is_non_positive_period());
            prop_assert!(cache
                .replace_with_expiration(key.clone(), 0, Duration::ZERO)
                .await
                .unwrap_err()
                .is_non_positive_period());
            prop_assert!(cache
                .expire(&key, Duration::ZERO)
                .await
                .unwrap_err()
                .is_non_positive_period());
            prop_assert!(cache
                .store_with_update(key.clone(), 0, None, Duration::from_secs(1))
                .await
                .unwrap_err()
                .is_nil_update_func());
            prop_assert!(cache
                .replace_with_update(key.clone(), 0, None, Duration::from_secs(1))
                .await
                .unwrap_err()
                .is_nil_update_func());
            prop_assert!(cache
                .store_with_update(key.clone(), 0, Some(update_fn(|v: &u32| *v)), Duration::ZERO)
                .await
                .unwrap_err()
                .is_non_positive_period());

            prop_assert_eq!(cache.describe(&key).await.ok(), before);
            prop_assert_eq!(cache.get(&key).await.ok(), present.then_some(value));
            Ok::<(), TestCaseError>(())
        })?;
    }
}
