use dupfinder::duplicates::find_duplicates;
use dupfinder::scanner::path_reader::{
    filter_paths, read_paths_from_lines, read_paths_from_null_delimited,
};
use std::fs;
use std::io::Cursor;
use tempfile::tempdir;

#[test]
fn test_lines_feed_the_finder() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, b"same").unwrap();
    fs::write(&b, b"same").unwrap();

    let listing = format!("{}\n{}\n{}\n", a.display(), b.display(), a.display());
    let paths = read_paths_from_lines(Cursor::new(listing)).unwrap();
    assert_eq!(paths, vec![a.clone(), b.clone()]);

    let result = find_duplicates(paths);
    assert_eq!(result.group_paths(), vec![vec![a, b]]);
}

#[test]
fn test_null_delimited_names_with_newlines() {
    if cfg!(windows) {
        return;
    }
    let dir = tempdir().unwrap();
    let odd = dir.path().join("line\nbreak.txt");
    fs::write(&odd, b"x").unwrap();

    let input = format!("{}\0", odd.display());
    let paths = read_paths_from_null_delimited(Cursor::new(input)).unwrap();
    assert_eq!(paths, vec![odd]);
}

#[test]
fn test_crlf_lines() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    fs::write(&a, b"x").unwrap();

    let input = format!("{}\r\n", a.display());
    let paths = read_paths_from_lines(Cursor::new(input)).unwrap();
    assert_eq!(paths, vec![a]);
}

#[test]
fn test_filter_cleans_paths() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    let file = sub.join("f");
    fs::write(&file, b"x").unwrap();

    let messy = dir.path().join("sub").join("..").join("sub").join(".").join("f");
    assert_eq!(filter_paths([messy]), vec![file]);
}

#[test]
fn test_nothing_exists() {
    let dir = tempdir().unwrap();
    let paths = read_paths_from_lines(Cursor::new(format!(
        "{}\n\n{}\n",
        dir.path().join("x").display(),
        dir.path().join("y").display()
    )))
    .unwrap();
    assert!(paths.is_empty());
}
