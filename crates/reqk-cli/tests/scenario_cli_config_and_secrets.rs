use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn scenario_config_hash_is_stable_across_key_order() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let a = dir.path().join("a.yaml");
    let b = dir.path().join("b.yaml");
    std::fs::write(&a, "directory:\n  page_size: 100\n  max_pages: 5\n")?;
    std::fs::write(&b, "directory:\n  max_pages: 5\n  page_size: 100\n")?;

    let hash_of = |path: &std::path::Path| -> anyhow::Result<String> {
        let out = Command::cargo_bin("reqk")?
            .current_dir(dir.path())
            .args(["config-hash", &path.to_string_lossy()])
            .output()?;
        assert!(out.status.success());
        let stdout = String::from_utf8(out.stdout)?;
        let line = stdout
            .lines()
            .find(|l| l.starts_with("config_hash="))
            .unwrap_or_default()
            .to_string();
        Ok(line)
    };

    let ha = hash_of(&a)?;
    assert!(ha.len() > "config_hash=".len());
    assert_eq!(ha, hash_of(&b)?);
    Ok(())
}

#[test]
fn scenario_secret_literal_in_config_is_refused() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "directory:\n  token_env: \"Bearer abc.def\"\n")?;

    Command::cargo_bin("reqk")?
        .current_dir(dir.path())
        .args(["config-hash", &path.to_string_lossy()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_SECRET_DETECTED"));
    Ok(())
}

#[test]
fn scenario_directory_requires_token_env() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("cfg.yaml");
    std::fs::write(&path, "directory:\n  token_env: REQK_TEST_MISSING_TOKEN\n")?;

    Command::cargo_bin("reqk")?
        .current_dir(dir.path())
        .env_remove("REQK_TEST_MISSING_TOKEN")
        .args(["directory", "--config", &path.to_string_lossy()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("REQK_TEST_MISSING_TOKEN"))
        .stderr(predicate::str::contains("abc").not());
    Ok(())
}

#[test]
fn scenario_strict_directory_refuses_unknown_keys() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("cfg.yaml");
    std::fs::write(
        &path,
        "directory:\n  token_env: REQK_TEST_STRICT_TOKEN\n  page_sise: 50\n",
    )?;

    Command::cargo_bin("reqk")?
        .current_dir(dir.path())
        .env("REQK_TEST_STRICT_TOKEN", "t")
        .args(["directory", "--config", &path.to_string_lossy(), "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_UNUSED_KEYS"))
        .stderr(predicate::str::contains("/directory/page_sise"));
    Ok(())
}
