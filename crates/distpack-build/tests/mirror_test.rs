use std::path::PathBuf;

use distpack_build::mirror::mirror;
use tempfile::TempDir;

#[test]
fn mirror_copies_files_and_empty_directories() {
    let src = TempDir::new().unwrap();
    std::fs::create_dir_all(src.path().join("inc/partials")).unwrap();
    std::fs::create_dir(src.path().join("languages")).unwrap();
    std::fs::write(src.path().join("style.css"), "css").unwrap();
    std::fs::write(src.path().join("inc/partials/header.php"), "<?php").unwrap();

    let out = TempDir::new().unwrap();
    let target = out.path().join("theme");
    let copied = mirror(src.path(), &target, &[]).unwrap();

    assert_eq!(copied, 2);
    assert_eq!(std::fs::read_to_string(target.join("style.css")).unwrap(), "css");
    assert!(target.join("inc/partials/header.php").is_file());
    assert!(target.join("languages").is_dir());
}

#[test]
fn mirror_leaves_out_skipped_paths() {
    let src = TempDir::new().unwrap();
    std::fs::create_dir_all(src.path().join("dist/old")).unwrap();
    std::fs::write(src.path().join("dist/old/theme.zip"), "zip").unwrap();
    std::fs::write(src.path().join("index.php"), "<?php").unwrap();

    let out = TempDir::new().unwrap();
    let target = out.path().join("theme");
    let skip: Vec<PathBuf> = vec![src.path().join("dist")];
    mirror(src.path(), &target, &skip).unwrap();

    assert!(target.join("index.php").exists());
    assert!(!target.join("dist").exists());
}

#[cfg(unix)]
#[test]
fn mirror_recreates_symlinks() {
    let src = TempDir::new().unwrap();
    std::fs::write(src.path().join("real.txt"), "x").unwrap();
    std::os::unix::fs::symlink("real.txt", src.path().join("link.txt")).unwrap();

    let out = TempDir::new().unwrap();
    let target = out.path().join("theme");
    mirror(src.path(), &target, &[]).unwrap();

    let link = target.join("link.txt");
    assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
    assert_eq!(std::fs::read_link(link).unwrap(), PathBuf::from("real.txt"));
}
