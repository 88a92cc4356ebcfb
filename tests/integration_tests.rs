mod common;

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use common::{fast_png_bytes, jpeg_bytes};
use predicates::prelude::*;
use std::fs;

fn compressimages() -> Command {
    Command::cargo_bin("compressimages").unwrap()
}

#[test]
fn test_cli_help() {
    compressimages()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--quality"))
        .stdout(predicate::str::contains("<PATH>"));
}

#[test]
fn test_cli_short_help() {
    compressimages().arg("-h").assert().success();
}

#[test]
fn test_cli_version() {
    compressimages().arg("--version").assert().success();
}

#[test]
fn test_missing_path_argument() {
    compressimages().assert().failure().code(2);
}

#[test]
fn test_nonexistent_path() {
    compressimages()
        .arg("definitely/not/here")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid path"));
}

#[test]
fn test_invalid_quality_touches_nothing() {
    let temp = TempDir::new().unwrap();
    let photo = temp.child("photo.jpg");
    let original = jpeg_bytes(100);
    photo.write_binary(&original).unwrap();

    for quality in ["0", "101"] {
        compressimages()
            .args(["-q", quality])
            .arg(temp.path())
            .assert()
            .failure()
            .code(2);
    }

    assert_eq!(fs::read(photo.path()).unwrap(), original);
}

#[test]
fn test_compress_single_file() {
    let temp = TempDir::new().unwrap();
    let photo = temp.child("photo.jpg");
    let original = jpeg_bytes(100);
    photo.write_binary(&original).unwrap();

    compressimages()
        .args(["--quality", "50"])
        .arg(photo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully updated file count: 1"));

    assert!(fs::metadata(photo.path()).unwrap().len() < original.len() as u64);
}

#[test]
fn test_compress_directory() {
    let temp = TempDir::new().unwrap();
    let jpeg = temp.child("holiday/beach.JPG");
    let png = temp.child("holiday/deep/map.png");
    let fake = temp.child("broken.png");
    let text = temp.child("notes.txt");

    let jpeg_original = jpeg_bytes(100);
    let png_original = fast_png_bytes();
    jpeg.write_binary(&jpeg_original).unwrap();
    png.write_binary(&png_original).unwrap();
    fake.write_str("this is not a png").unwrap();
    text.write_str("leave me alone").unwrap();

    compressimages()
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Files examined: 3"))
        .stdout(predicate::str::contains("Successfully updated file count: 2"))
        .stderr(predicate::str::contains("broken.png"));

    assert!(fs::metadata(jpeg.path()).unwrap().len() < jpeg_original.len() as u64);
    assert!(fs::metadata(png.path()).unwrap().len() < png_original.len() as u64);
    fake.assert("this is not a png");
    text.assert("leave me alone");
}

#[test]
fn test_fake_png_single_file_exits_zero() {
    let temp = TempDir::new().unwrap();
    let fake = temp.child("fake.png");
    fake.write_str("plain text").unwrap();

    compressimages()
        .arg(fake.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Failure whilst processing"));

    fake.assert("plain text");
}

#[test]
fn test_png_with_bitmap_signature_is_codec_error() {
    let temp = TempDir::new().unwrap();
    let notes = temp.child("bm.png");
    notes.write_str("BM notes: buy milk").unwrap();

    compressimages()
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed files: 1"))
        .stdout(predicate::str::contains("Ignoring file").not())
        .stderr(predicate::str::contains("Failure whilst processing"))
        .stderr(predicate::str::contains("bm.png"));

    notes.assert("BM notes: buy milk");
}

#[test]
fn test_second_pass_is_negligible() {
    let temp = TempDir::new().unwrap();
    let photo = temp.child("photo.jpg");
    photo.write_binary(&jpeg_bytes(100)).unwrap();

    compressimages().arg(photo.path()).assert().success();
    let first = fs::metadata(photo.path()).unwrap().len();

    compressimages().arg(photo.path()).assert().success();
    let second = fs::metadata(photo.path()).unwrap().len();

    assert!(second <= first);
    assert!(second >= first * 9 / 10, "{} -> {}", first, second);
}

#[test]
fn test_quiet_prints_nothing_on_success() {
    let temp = TempDir::new().unwrap();
    temp.child("photo.jpg").write_binary(&jpeg_bytes(100)).unwrap();

    compressimages()
        .arg("--quiet")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_backup_then_restore() {
    let temp = TempDir::new().unwrap();
    let photo = temp.child("photo.jpg");
    let original = jpeg_bytes(100);
    photo.write_binary(&original).unwrap();

    compressimages()
        .args(["--backup", "-q", "40"])
        .arg(temp.path())
        .assert()
        .success();

    let backup = temp.child("compressimages-backup-photo.jpg");
    backup.assert(predicate::path::exists());
    assert!(fs::metadata(photo.path()).unwrap().len() < original.len() as u64);

    compressimages()
        .args(["--mode", "restore-backup"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully restored backup file count: 1"));

    backup.assert(predicate::path::missing());
    assert_eq!(fs::read(photo.path()).unwrap(), original);
}

#[test]
fn test_backup_then_delete() {
    let temp = TempDir::new().unwrap();
    let photo = temp.child("photo.jpg");
    photo.write_binary(&jpeg_bytes(100)).unwrap();

    compressimages()
        .arg("--backup")
        .arg(temp.path())
        .assert()
        .success();

    compressimages()
        .args(["--mode", "delete-backup"])
        .arg(temp.path())
        .assert()
        .success();

    temp.child("compressimages-backup-photo.jpg")
        .assert(predicate::path::missing());
    photo.assert(predicate::path::exists());
}

#[test]
fn test_backup_mode_rejects_file() {
    let temp = TempDir::new().unwrap();
    let photo = temp.child("photo.jpg");
    photo.write_binary(&jpeg_bytes(90)).unwrap();

    compressimages()
        .args(["--mode", "restore-backup"])
        .arg(photo.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("directories only"));
}

#[test]
fn test_backup_mode_rejects_compress_flags() {
    let temp = TempDir::new().unwrap();
    let photo = temp.child("photo.jpg");
    let original = jpeg_bytes(100);
    photo.write_binary(&original).unwrap();

    for extra in [&["-q", "60"][..], &["--backup"][..]] {
        compressimages()
            .args(["--mode", "delete-backup"])
            .args(extra)
            .arg(temp.path())
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("cannot be used with"));
    }

    assert_eq!(fs::read(photo.path()).unwrap(), original);
}
