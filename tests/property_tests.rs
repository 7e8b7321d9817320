use dupfinder::duplicates::{find_duplicates, FileComparator, PoolTracker};
use proptest::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_compare_matches_size_then_bytes(
        a in prop::collection::vec(any::<u8>(), 0..300),
        b in prop::collection::vec(any::<u8>(), 0..300),
        chunk in 1usize..64,
    ) {
        let dir = TempDir::new().unwrap();
        let pa = dir.path().join("a");
        let pb = dir.path().join("b");
        fs::write(&pa, &a).unwrap();
        fs::write(&pb, &b).unwrap();

        let comparator = FileComparator::new(chunk);
        let forward = comparator.compare(&pa, &pb).ordering();
        let backward = comparator.compare(&pb, &pa).ordering();

        // Same-size files split into equally long chunks, so the first
        // differing chunk decides exactly like the first differing byte.
        let expected = a.len().cmp(&b.len()).then_with(|| a.cmp(&b));
        prop_assert_eq!(forward, Some(expected));
        prop_assert_eq!(backward, Some(expected.reverse()));
    }

    #[test]
    fn test_compare_self_is_equal(content in prop::collection::vec(any::<u8>(), 0..500)) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f");
        fs::write(&path, &content).unwrap();

        let comparator = FileComparator::new(7);
        prop_assert_eq!(comparator.compare(&path, &path).ordering(), Some(Ordering::Equal));
    }

    #[test]
    fn test_tracker_is_transitive(
        pairs in prop::collection::vec((0usize..12, 0usize..12), 0..40)
    ) {
        let names: Vec<PathBuf> = (0..12).map(|i| PathBuf::from(format!("/f{i:02}"))).collect();

        let mut tracker = PoolTracker::new();
        // Reference union-find over indices.
        let mut parent: Vec<usize> = (0..12).collect();
        fn root(parent: &[usize], mut i: usize) -> usize {
            while parent[i] != i {
                i = parent[i];
            }
            i
        }

        for &(x, y) in &pairs {
            tracker.declare_equal(&names[x], &names[y]);
            let (rx, ry) = (root(&parent, x), root(&parent, y));
            parent[rx] = ry;
        }

        let mut expected: HashMap<usize, Vec<PathBuf>> = HashMap::new();
        for i in 0..12 {
            let involved = pairs.iter().any(|&(x, y)| (x == i || y == i) && x != y);
            if involved {
                let r = root(&parent, i);
                expected.entry(r).or_default().push(names[i].clone());
            }
        }
        let mut expected: Vec<Vec<PathBuf>> = expected.into_values().collect();
        expected.sort();

        let mut pools = tracker.finalize_pools();
        pools.sort();
        prop_assert_eq!(pools, expected);
    }

    #[test]
    fn test_groups_are_exact_classes(classes in prop::collection::vec(0u8..4, 1..16)) {
        let dir = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = classes
            .iter()
            .enumerate()
            .map(|(i, class)| {
                let path = dir.path().join(format!("f{i:02}"));
                fs::write(&path, [*class; 3]).unwrap();
                path
            })
            .collect();

        let result = find_duplicates(paths.clone());

        let mut expected: Vec<Vec<PathBuf>> = (0u8..4)
            .map(|c| {
                paths
                    .iter()
                    .zip(&classes)
                    .filter(|(_, class)| **class == c)
                    .map(|(p, _)| p.clone())
                    .collect::<Vec<_>>()
            })
            .filter(|members| members.len() >= 2)
            .collect();
        expected.sort();

        prop_assert!(result.failures.is_empty());
        prop_assert_eq!(result.group_paths(), expected);
    }
}
