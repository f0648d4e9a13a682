#![allow(clippy::unwrap_used)]

use super::*;

fn ym(s: &str) -> YearMonth {
    s.parse().unwrap()
}

#[test]
fn test_loads_once_then_hits() {
    let mut cache: MonthCache<String> = MonthCache::new();
    let mut loads = 0;
    for _ in 0..3 {
        let value = cache
            .get_or_try_load(1, ym("2024-03"), || {
                loads += 1;
                Ok::<_, ()>("march".to_string())
            })
            .unwrap();
        assert_eq!(value, "march");
    }
    assert_eq!(loads, 1);
    assert_eq!(cache.stats(), (2, 1));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_failed_load_is_not_cached() {
    let mut cache: MonthCache<u32> = MonthCache::new();
    let err = cache.get_or_try_load(1, ym("2024-03"), || Err("boom"));
    assert_eq!(err, Err("boom"));
    assert!(cache.is_empty());
    let ok = cache.get_or_try_load(1, ym("2024-03"), || Ok::<_, &str>(7));
    assert_eq!(ok, Ok(&7));
}

#[test]
fn test_keys_separate_users_and_months() {
    let mut cache: MonthCache<u32> = MonthCache::new();
    cache.get_or_try_load(1, ym("2024-03"), || Ok::<_, ()>(1)).unwrap();
    cache.get_or_try_load(2, ym("2024-03"), || Ok::<_, ()>(2)).unwrap();
    cache.get_or_try_load(1, ym("2024-04"), || Ok::<_, ()>(3)).unwrap();
    assert_eq!(cache.get(1, ym("2024-03")), Some(&1));
    assert_eq!(cache.get(2, ym("2024-03")), Some(&2));
    assert_eq!(cache.get(1, ym("2024-04")), Some(&3));
    assert_eq!(cache.get(2, ym("2024-04")), None);
}

#[test]
fn test_invalidation() {
    let mut cache: MonthCache<u32> = MonthCache::new();
    for (user, month) in [(1, "2024-01"), (1, "2024-02"), (2, "2024-01")] {
        cache.get_or_try_load(user, ym(month), || Ok::<_, ()>(0)).unwrap();
    }
    cache.invalidate(1, ym("2024-01"));
    assert_eq!(cache.len(), 2);
    cache.invalidate_user(1);
    assert_eq!(cache.len(), 1);
    assert!(cache.get(2, ym("2024-01")).is_some());
}
