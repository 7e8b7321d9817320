use dupfinder::duplicates::{DuplicateFinder, FinderConfig};
use dupfinder::scanner::{Walker, WalkerConfig};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn populate(root: &Path) {
    let pdf: &[u8] = b"pdf pdf pdf";
    let big: &[u8] = &[0u8; 4096];
    for (name, content) in [
        ("docs/report.pdf", pdf),
        ("docs/report_copy.pdf", pdf),
        ("docs/notes.txt", pdf),
        (".cache/report.pdf", pdf),
        ("big.bin", big),
        ("big_copy.bin", big),
    ] {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

fn relative(root: &Path, files: &[std::path::PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[test]
fn test_walk_is_sorted_and_complete() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    let walker = Walker::new(dir.path(), WalkerConfig::default());
    let files: Vec<_> = walker
        .walk()
        .filter_map(Result::ok)
        .map(|f| f.path)
        .collect();

    assert_eq!(files.len(), 6);
    let mut sorted = relative(dir.path(), &files);
    sorted.sort();
    assert!(sorted.contains(&".cache/report.pdf".to_string()));
}

#[test]
fn test_include_pattern_limits_groups() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    let walker_config = WalkerConfig::default()
        .with_patterns(&[r"\.pdf$".to_string()], &[])
        .unwrap();
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let (result, _) = finder
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(
        relative(dir.path(), &result.groups[0].files),
        vec![".cache/report.pdf", "docs/report.pdf", "docs/report_copy.pdf"]
    );
}

#[test]
fn test_skip_hidden_and_exclude() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    let walker_config = WalkerConfig {
        skip_hidden: true,
        ..WalkerConfig::default()
    }
    .with_patterns(&[], &[r"big(_copy)?\.bin$".to_string()])
    .unwrap();
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let (result, summary) = finder
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(summary.input_files, 3);
    assert_eq!(
        relative(dir.path(), &result.groups[0].files),
        vec!["docs/notes.txt", "docs/report.pdf", "docs/report_copy.pdf"]
    );
}

#[test]
fn test_size_window() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    let walker_config = WalkerConfig {
        min_size: 100,
        max_size: Some(10_000),
        ..WalkerConfig::default()
    };
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let (result, summary) = finder
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(summary.input_files, 2);
    assert_eq!(
        relative(dir.path(), &result.groups[0].files),
        vec!["big.bin", "big_copy.bin"]
    );
    assert_eq!(result.groups[0].size, 4096);
    assert_eq!(summary.reclaimable_space, 4096);
}
