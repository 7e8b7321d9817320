use dupfinder::duplicates::{
    find_duplicates, CompareError, DuplicateFinder, FileComparator, FinderConfig,
};
use std::cmp::Ordering;
use std::fs;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

fn write(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_two_different_files() {
    let dir = tempdir().unwrap();
    let a = write(&dir, "a", b"foo");
    let b = write(&dir, "b", b"bar");

    let result = find_duplicates(vec![a, b]);

    assert!(result.groups.is_empty());
    assert!(result.failures.is_empty());
}

#[test]
fn test_two_identical_files() {
    let dir = tempdir().unwrap();
    let a = write(&dir, "a", b"foo");
    let b = write(&dir, "b", b"foo");

    let result = find_duplicates(vec![b.clone(), a.clone()]);

    assert_eq!(result.group_paths(), vec![vec![a, b]]);
    assert!(result.failures.is_empty());
}

#[test]
fn test_two_classes_and_a_unique_file() {
    let dir = tempdir().unwrap();
    let foo1 = write(&dir, "foo1", b"foo");
    let foo2 = write(&dir, "foo2", b"foo");
    let foo3 = write(&dir, "foo3", b"foo");
    let bar1 = write(&dir, "bar1", b"bar");
    let bar2 = write(&dir, "bar2", b"bar");
    let baz = write(&dir, "baz", b"baz");

    let result = find_duplicates(vec![
        foo1.clone(),
        bar1.clone(),
        baz.clone(),
        foo2.clone(),
        bar2.clone(),
        foo3.clone(),
    ]);

    // Same size, so groups are ordered by first path: "bar1" < "foo1".
    assert_eq!(
        result.group_paths(),
        vec![vec![bar1, bar2], vec![foo1, foo2, foo3]]
    );
    assert!(result.failures.is_empty());
    assert!(result.groups.iter().all(|g| !g.files.contains(&baz)));
}

#[test]
fn test_nonexistent_and_real_file() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nonexistent");
    let real = write(&dir, "real", b"data");

    let result = find_duplicates(vec![missing.clone(), real]);

    assert!(result.groups.is_empty());
    assert_eq!(result.failed_paths(), vec![missing]);
}

#[test]
fn test_groups_ordered_by_size() {
    let dir = tempdir().unwrap();
    let big1 = write(&dir, "a_big1", &[7u8; 300]);
    let big2 = write(&dir, "a_big2", &[7u8; 300]);
    let small1 = write(&dir, "z_small1", &[7u8; 3]);
    let small2 = write(&dir, "z_small2", &[7u8; 3]);

    let result = find_duplicates(vec![big1.clone(), small1.clone(), big2.clone(), small2.clone()]);

    assert_eq!(
        result.group_paths(),
        vec![vec![small1, small2], vec![big1, big2]]
    );
    assert_eq!(result.groups[0].size, 3);
    assert_eq!(result.groups[1].size, 300);
}

#[test]
fn test_many_copies_in_scrambled_order() {
    let dir = tempdir().unwrap();
    let mut paths = Vec::new();
    for class in 0..4u8 {
        for copy in 0..5 {
            let content = vec![class; 64];
            paths.push(write(&dir, &format!("c{class}_{copy}"), &content));
        }
    }
    // Interleave: c0_0, c1_0, c2_0, c3_0, c0_1, ...
    let mut scrambled = Vec::new();
    for copy in 0..5 {
        for class in 0..4 {
            scrambled.push(paths[class * 5 + copy].clone());
        }
    }
    scrambled.reverse();

    let result = find_duplicates(scrambled);

    assert_eq!(result.groups.len(), 4);
    for (class, group) in result.groups.iter().enumerate() {
        assert_eq!(group.files, paths[class * 5..class * 5 + 5].to_vec());
    }
}

#[test]
fn test_difference_in_last_byte_with_small_chunks() {
    let dir = tempdir().unwrap();
    let content: Vec<u8> = (0..10_000u32).map(|i| (i * 31 % 256) as u8).collect();
    let mut changed = content.clone();
    *changed.last_mut().unwrap() ^= 1;

    let a = write(&dir, "a", &content);
    let b = write(&dir, "b", &changed);
    let c = write(&dir, "c", &content);

    let finder = DuplicateFinder::new(FinderConfig::default().with_chunk_size(100));
    let (result, summary) = finder.find_duplicates(vec![a.clone(), b, c.clone()]).unwrap();

    assert_eq!(result.group_paths(), vec![vec![a, c]]);
    assert!(summary.bytes_compared >= 20_000);
}

#[test]
fn test_failure_among_many() {
    let dir = tempdir().unwrap();
    let mut paths = Vec::new();
    for i in 0..6 {
        paths.push(write(&dir, &format!("dup{i}"), b"duplicate"));
    }
    paths.push(write(&dir, "other", b"something else"));
    let missing = dir.path().join("missing");
    paths.insert(2, missing.clone());

    let result = find_duplicates(paths);

    assert_eq!(result.failed_paths(), vec![missing]);
    assert!(matches!(
        result.failures[0].error,
        CompareError::Stat { .. }
    ));
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].len(), 6);
}

#[test]
fn test_every_group_has_two_members() {
    let dir = tempdir().unwrap();
    let mut paths = Vec::new();
    for i in 0..12u8 {
        let class = i % 6;
        let content = [class; 10];
        paths.push(write(&dir, &format!("f{i:02}"), &content));
    }

    let result = find_duplicates(paths);

    assert_eq!(result.groups.len(), 6);
    assert!(result.groups.iter().all(|g| g.len() == 2));
}

#[test]
fn test_comparator_properties() {
    let dir = tempdir().unwrap();
    let small = write(&dir, "small", b"zzz");
    let large = write(&dir, "large", b"aaaa");
    let x = write(&dir, "x", b"abcd");
    let y = write(&dir, "y", b"abce");

    let comparator = FileComparator::new(2);
    assert!(comparator.compare(&x, &x).is_identical());
    assert_eq!(
        comparator.compare(&small, &large).ordering(),
        Some(Ordering::Less)
    );
    assert_eq!(comparator.compare(&x, &y).ordering(), Some(Ordering::Less));
    assert_eq!(comparator.compare(&y, &x).ordering(), Some(Ordering::Greater));
}

#[test]
fn test_find_in_directory_tree() {
    let dir = tempdir().unwrap();
    let a = write(&dir, "photos/2020/img.jpg", b"jpeg bytes");
    let b = write(&dir, "backup/img_copy.jpg", b"jpeg bytes");
    write(&dir, "photos/2021/other.jpg", b"other bytes");
    write(&dir, "empty.txt", b"");
    write(&dir, "also_empty.txt", b"");

    let finder = DuplicateFinder::with_defaults();
    let (result, summary) = finder
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(summary.input_files, 3);
    assert_eq!(result.group_paths(), vec![vec![b, a]]);
}

#[test]
fn test_overlapping_roots_count_files_once() {
    let dir = tempdir().unwrap();
    let a = write(&dir, "sub/a", b"same");
    let b = write(&dir, "b", b"same");

    let finder = DuplicateFinder::with_defaults();
    let (result, summary) = finder
        .find_duplicates_in_paths(&[dir.path().to_path_buf(), dir.path().join("sub"), a.clone()])
        .unwrap();

    assert_eq!(summary.input_files, 2);
    assert_eq!(result.group_paths(), vec![vec![b, a]]);
}

#[cfg(unix)]
#[test]
fn test_symlinked_file_only_with_follow() {
    use dupfinder::scanner::WalkerConfig;

    let dir = tempdir().unwrap();
    let target = write(&dir, "target", b"linked content");
    let link = dir.path().join("link");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (result, _) = finder
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();
    assert!(result.groups.is_empty());

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        follow_symlinks: true,
        ..Default::default()
    });
    let (result, _) = DuplicateFinder::new(config)
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();
    assert_eq!(result.group_paths(), vec![vec![link, target]]);
}

#[test]
fn test_unicode_names() {
    let dir = tempdir().unwrap();
    let a = write(&dir, "café.txt", b"unicode");
    let b = write(&dir, "日本語.txt", b"unicode");

    let result = find_duplicates(vec![a.clone(), b.clone()]);

    assert_eq!(result.groups.len(), 1);
    assert!(result.groups[0].files.contains(&a));
    assert!(result.groups[0].files.contains(&b));
}
