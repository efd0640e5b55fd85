use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

const KNOWN_BLOCK: &str = "Known Extensions:\n\
    images: JPEG, PNG, JPG, SVG\n\
    video: AVI, MP4, MOV, MKV\n\
    documents: DOC, DOCX, TXT, PDF, XLSX, PPTX\n\
    audio: MP3, OGG, WAV, AMR\n\
    archives: ZIP, GZ, TAR, RAR\n";

#[test]
fn test_cli_without_folder_prints_usage() -> Result<(), Box<dyn std::error::Error>> {
    let work_dir = tempdir()?;

    let mut cmd = Command::cargo_bin("clean-folder")?;
    cmd.current_dir(work_dir.path());
    cmd.assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Usage"));

    assert_eq!(fs::read_dir(work_dir.path())?.count(), 0);
    Ok(())
}

#[test]
fn test_cli_with_two_folders_prints_usage() -> Result<(), Box<dyn std::error::Error>> {
    let first = tempdir()?;
    let second = tempdir()?;
    fs::write(first.path().join("photo.png"), b"x")?;

    let mut cmd = Command::cargo_bin("clean-folder")?;
    cmd.arg(first.path()).arg(second.path());
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));

    assert!(first.path().join("photo.png").exists());
    assert!(!first.path().join("images").exists());
    Ok(())
}

#[test]
fn test_cli_sorts_and_prints_report() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    fs::write(root.path().join("report.PDF"), b"%PDF")?;
    fs::write(root.path().join("фото.jpg"), b"jpg")?;
    fs::write(root.path().join("data.xyz"), b"?")?;
    fs::write(root.path().join("notes.abc"), b"?")?;

    let expected = format!("{KNOWN_BLOCK}\nUnknown Extensions:\nABC, XYZ\n");
    let mut cmd = Command::cargo_bin("clean-folder")?;
    cmd.arg(root.path());
    cmd.assert().success().stdout(predicate::eq(expected));

    assert!(root.path().join("documents/report.PDF").exists());
    assert!(root.path().join("images/foto.jpg").exists());
    assert!(root.path().join("data.xyz").exists());
    assert!(!root.path().join("video").exists());
    Ok(())
}

#[test]
fn test_cli_missing_folder_fails() -> Result<(), Box<dyn std::error::Error>> {
    let parent = tempdir()?;
    let missing = parent.path().join("does-not-exist");

    let mut cmd = Command::cargo_bin("clean-folder")?;
    cmd.arg(&missing);
    cmd.assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("does-not-exist"));

    assert!(!missing.exists());
    Ok(())
}

#[test]
fn test_cli_dry_run_changes_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    fs::create_dir(root.path().join("nested"))?;
    fs::write(root.path().join("nested/song.mp3"), b"x")?;
    fs::write(root.path().join("odd.xyz"), b"y")?;

    let mut cmd = Command::cargo_bin("clean-folder")?;
    cmd.arg("--dry-run").arg(root.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with(KNOWN_BLOCK).and(predicate::str::ends_with("XYZ\n")))
        .stderr(predicate::str::contains("DRY RUN"));

    assert!(root.path().join("nested/song.mp3").exists());
    assert!(!root.path().join("audio").exists());
    Ok(())
}

#[test]
fn test_cli_json_report() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    fs::write(root.path().join("clip.mkv"), b"x")?;
    fs::write(root.path().join("README"), b"y")?;

    let mut cmd = Command::cargo_bin("clean-folder")?;
    cmd.arg("--json").arg(root.path());
    let output = cmd.output()?;
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["unknown_extensions"][0], "README");
    assert_eq!(json["moved"][0]["category"], "video");
    assert_eq!(json["known_extensions"]["archives"][0], "ZIP");
    assert!(root.path().join("video/clip.mkv").exists());
    Ok(())
}

#[test]
fn test_cli_invalid_config_fails_before_writing() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    let config_dir = tempdir()?;
    let config_path = config_dir.path().join("bad.toml");
    fs::write(&config_path, "[policy]\nmax_archive_depth = 0\n")?;
    fs::write(root.path().join("photo.png"), b"x")?;

    let mut cmd = Command::cargo_bin("clean-folder")?;
    cmd.arg("--config").arg(&config_path).arg(root.path());
    cmd.assert().code(1);

    assert!(root.path().join("photo.png").exists());
    assert!(!root.path().join("images").exists());
    Ok(())
}
