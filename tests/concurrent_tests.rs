#[cfg(test)]
mod tests {
    use std::thread;

    use keyed_index::{
        ConcurrentDualKeyIndex, ConcurrentGroupedKeyIndex, Container, DualKeyIndex, Error,
        GroupedKeyIndex,
    };

    const NUM_THREADS: usize = 100;

    #[test]
    fn dual_key_put_get_remove_test() {
        let index: ConcurrentDualKeyIndex<&str, i32, &str> = ConcurrentDualKeyIndex::new();
        assert_eq!(index.put("A", 1, "v1"), Ok(()));
        assert_eq!(index.put("A", 2, "v2"), Err(Error::KeyAConflict));
        assert_eq!(index.put("B", 1, "v2"), Err(Error::KeyBConflict));
        assert_eq!(index.get_by_key_a("A"), Some("v1"));
        assert_eq!(index.get_by_key_b(&1), Some("v1"));
        assert_eq!(index.get_key_a(&1), Some("A"));
        assert_eq!(index.get_key_b("A"), Some(1));
        assert!(index.contains_key_a("A") && index.contains_key_b(&1));

        assert_eq!(index.remove_by_key_b(&1), Ok("v1"));
        assert_eq!(index.remove_by_key_a("A"), Err(Error::NotFound));
        assert_eq!(index.get_by_key_a("A"), None);
        assert!(index.is_empty());
    }

    #[test]
    fn dual_key_render_test() {
        let index: ConcurrentDualKeyIndex<&str, i32, &str> = ConcurrentDualKeyIndex::new();
        index.put("A", 1, "v1").unwrap();
        assert_eq!(index.render(), r#"ConcurrentDualKeyIndex: {"A": "v1"}"#);
    }

    #[test]
    fn dual_key_concurrent_access_test() {
        let index: ConcurrentDualKeyIndex<String, usize, usize> =
            ConcurrentDualKeyIndex::with_capacity(NUM_THREADS);

        thread::scope(|s| {
            for i in 0..NUM_THREADS {
                let index = &index;
                s.spawn(move || index.put(format!("key{i}"), i, i * 10).unwrap());
            }
        });
        assert_eq!(index.len(), NUM_THREADS);

        thread::scope(|s| {
            for i in 0..NUM_THREADS {
                let index = &index;
                s.spawn(move || {
                    assert_eq!(index.get_by_key_a(format!("key{i}").as_str()), Some(i * 10));
                    assert_eq!(index.get_by_key_b(&i), Some(i * 10));
                });
            }
        });

        thread::scope(|s| {
            for i in 0..NUM_THREADS {
                let index = &index;
                s.spawn(move || {
                    if i % 2 == 0 {
                        index.remove_by_key_a(format!("key{i}").as_str()).unwrap();
                    } else {
                        index.remove_by_key_b(&i).unwrap();
                    }
                    assert_eq!(index.get_by_key_b(&i), None);
                });
            }
        });
        assert!(index.is_empty());
        assert!(index.into_inner().is_empty());
    }

    #[test]
    fn dual_key_conflicting_writers_test() {
        // Every thread races for the same key A; exactly one pairing wins
        let index: ConcurrentDualKeyIndex<&str, usize, usize> = ConcurrentDualKeyIndex::new();
        let winners: usize = thread::scope(|s| {
            let handles: Vec<_> = (0..NUM_THREADS)
                .map(|i| {
                    let index = &index;
                    s.spawn(move || index.put("shared", i, i).is_ok())
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap() as usize)
                .sum()
        });
        assert_eq!(winners, 1);
        assert_eq!(index.len(), 1);
        let partner = index.get_key_b("shared").unwrap();
        assert_eq!(index.get_by_key_b(&partner), Some(partner));
    }

    #[test]
    fn grouped_put_get_remove_test() {
        let index: ConcurrentGroupedKeyIndex<&str, &str, i32> = ConcurrentGroupedKeyIndex::new();
        index.put("p1", 100);
        index.put_secondary_keys("p1", "emails", ["a@x.com", "b@x.com"]);
        assert!(index.has_primary_key("p1"));
        assert!(index.has_secondary_key("emails", "b@x.com"));
        assert_eq!(index.get("p1"), Some(100));
        assert_eq!(index.get_by_secondary_key("emails", "a@x.com"), Some(100));
        assert_eq!(index.get_primary_key("emails", "a@x.com"), Some("p1"));
        assert_eq!(index.secondary_keys("p1").len(), 2);
        assert_eq!(index.get_all_key_groups()["emails"].len(), 2);

        assert_eq!(index.remove("p1"), Some(100));
        assert!(!index.has_primary_key("p1"));
        assert!(!index.has_secondary_key("emails", "a@x.com"));
        assert!(!index.has_secondary_key("emails", "b@x.com"));
        assert!(index.get_all_key_groups().is_empty());
        assert_eq!(index.render(), "ConcurrentGroupedKeyIndex: {}");
    }

    #[test]
    fn grouped_concurrent_access_test() {
        let index: ConcurrentGroupedKeyIndex<String, String, usize> =
            ConcurrentGroupedKeyIndex::default();

        thread::scope(|s| {
            for i in 0..NUM_THREADS {
                let index = &index;
                s.spawn(move || {
                    index.put(format!("key{i}"), i);
                    index.put_secondary_keys(format!("key{i}"), "ids", vec![i.to_string()]);
                });
            }
        });
        assert_eq!(index.len(), NUM_THREADS);
        assert_eq!(index.get_all_key_groups()["ids"].len(), NUM_THREADS);

        thread::scope(|s| {
            for i in 0..NUM_THREADS {
                let index = &index;
                s.spawn(move || {
                    assert_eq!(index.get(format!("key{i}").as_str()), Some(i));
                    assert_eq!(index.get_by_secondary_key("ids", i.to_string().as_str()), Some(i));
                });
            }
        });

        thread::scope(|s| {
            for i in 0..NUM_THREADS {
                let index = &index;
                s.spawn(move || {
                    let key = format!("key{i}");
                    index.remove(key.as_str());
                    assert_eq!(index.get(key.as_str()), None);
                    assert!(!index.has_secondary_key("ids", i.to_string().as_str()));
                });
            }
        });
        assert!(index.is_empty());
        assert!(index.get_all_key_groups().is_empty());
    }

    #[test]
    fn readers_see_whole_writes_test() {
        // Snapshots taken while a writer churns are never torn
        let index: ConcurrentGroupedKeyIndex<usize, usize, usize> = ConcurrentGroupedKeyIndex::new();
        thread::scope(|s| {
            let index = &index;
            s.spawn(move || {
                for i in 0..1000 {
                    index.put(i, i);
                    index.put_secondary_keys(i, "mirror", [i]);
                    index.remove(&i);
                }
            });
            s.spawn(move || {
                for _ in 0..1000 {
                    for (_, keys) in index.get_all_key_groups() {
                        for (secondary, primary) in keys {
                            assert_eq!(secondary, primary);
                        }
                    }
                }
            });
        });
        assert!(index.is_empty());
        assert!(index.get_all_key_groups().is_empty());
    }

    fn drain_all<T, C: Container<T> + ?Sized>(container: &mut C) -> Vec<T> {
        let values = container.values();
        container.clear();
        values
    }

    #[test]
    fn container_contract_test() {
        let mut dual: DualKeyIndex<&str, i32, i32> = DualKeyIndex::new();
        dual.put("a", 1, 1).unwrap();
        let mut grouped: GroupedKeyIndex<&str, &str, i32> = GroupedKeyIndex::new();
        grouped.put("a", 2);
        let mut concurrent_dual: ConcurrentDualKeyIndex<&str, i32, i32> = dual.clone().into();
        let mut concurrent_grouped: ConcurrentGroupedKeyIndex<&str, &str, i32> =
            grouped.clone().into();

        let containers: Vec<&mut dyn Container<i32>> = vec![
            &mut dual,
            &mut grouped,
            &mut concurrent_dual,
            &mut concurrent_grouped,
        ];
        for container in containers {
            assert_eq!(container.len(), 1);
            assert!(!container.is_empty());
            assert!(container.render().contains("Index: {\"a\": "));
            assert_eq!(drain_all(&mut *container).len(), 1);
            assert!(container.is_empty());
            assert_eq!(container.len(), 0);
        }
    }
}
