use distpack_core::PatternSet;
use tempfile::TempDir;

#[test]
fn load_returns_empty_set_when_file_missing() {
    let tmp = TempDir::new().unwrap();
    let set = PatternSet::load(&tmp.path().join(".distignore")).unwrap();

    assert!(set.is_empty());
    assert!(!set.should_remove("anything"));
}

#[test]
fn load_splits_excludes_and_includes_in_file_order() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(".distignore");
    std::fs::write(
        &path,
        "node_modules/*\n!node_modules/keep/*\n*.map\n!dist/app.js.map\n",
    )
    .unwrap();

    let set = PatternSet::load(&path).unwrap();

    let excludes: Vec<&str> = set.excludes.iter().map(|p| p.as_str()).collect();
    let includes: Vec<&str> = set.includes.iter().map(|p| p.as_str()).collect();
    assert_eq!(excludes, vec!["node_modules/*", "*.map"]);
    assert_eq!(includes, vec!["node_modules/keep/*", "dist/app.js.map"]);
}

#[test]
fn comments_and_blank_lines_yield_empty_set() {
    let set = PatternSet::parse("# build artifacts\n\n   \n   # indented comment\n\t\n");
    assert!(set.is_empty());
}

#[test]
fn lines_are_trimmed() {
    let set = PatternSet::parse("   vendor/*   \n\t!vendor/autoload.php\r\n");

    assert_eq!(set.excludes[0].as_str(), "vendor/*");
    assert_eq!(set.includes[0].as_str(), "vendor/autoload.php");
}

#[test]
fn include_overrides_exclude() {
    let set = PatternSet::parse("build/*\n!build/keep.txt\n");

    assert!(set.should_remove("build/drop.txt"));
    assert!(!set.should_remove("build/keep.txt"));
    assert!(set.should_remove("build"));
}

#[test]
fn include_without_matching_exclude_is_harmless() {
    let set = PatternSet::parse("!style.css\n");

    assert!(set.is_included("style.css"));
    assert!(!set.should_remove("style.css"));
}

#[test]
fn duplicate_rules_are_kept() {
    let set = PatternSet::parse("*.log\n*.log\n");

    assert_eq!(set.excludes.len(), 2);
    assert!(set.should_remove("debug.log"));
}

#[test]
fn load_fails_when_path_is_a_directory() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(".distignore");
    std::fs::create_dir(&path).unwrap();

    let result = PatternSet::load(&path);
    assert!(matches!(
        result,
        Err(distpack_core::Error::IgnoreFileRead { .. })
    ));
}
