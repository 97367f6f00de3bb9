use mediaconfig::Config;
use std::fs;

#[test]
fn test_defaults_from_embedded_config() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = Config::load_config(dir.path().to_str().unwrap())?;

    assert_eq!(config.get_output_format(), "markdown");
    assert_eq!(config.get_log_min_level(), "INFO");
    assert!(!config.get_audio_only());
    assert_eq!(
        config.get_preferred_mime_types(),
        ["audio/flac", "audio/x-flac", "audio/wav", "audio/mpeg"]
    );

    // The merged configuration is written back
    assert!(dir.path().join("config.yaml").exists());
    Ok(())
}

#[test]
fn test_config_file_is_merged_over_defaults() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join("config.yaml"),
        "Inspect:\n  Format: json\nlogger:\n  min_level: DEBUG\n",
    )?;

    let config = Config::load_config(dir.path().to_str().unwrap())?;

    assert_eq!(config.get_output_format(), "json");
    assert_eq!(config.get_log_min_level(), "DEBUG");
    // Untouched keys keep their default
    assert!(!config.get_audio_only());
    assert_eq!(config.get_preferred_mime_types().len(), 4);
    Ok(())
}

#[test]
fn test_setters_persist_across_reload() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().to_str().unwrap();

    {
        let config = Config::load_config(path)?;
        config.set_output_format("yaml")?;
        config.set_audio_only(true)?;
        config.set_preferred_mime_types(&["audio/mpeg"])?;
    }

    let reloaded = Config::load_config(path)?;
    assert_eq!(reloaded.get_output_format(), "yaml");
    assert!(reloaded.get_audio_only());
    assert_eq!(reloaded.get_preferred_mime_types(), ["audio/mpeg"]);
    Ok(())
}

#[test]
fn test_wrong_type_falls_back_to_default() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join("config.yaml"),
        "inspect:\n  format: 42\n  audio_only: maybe\n",
    )?;

    let config = Config::load_config(dir.path().to_str().unwrap())?;
    assert_eq!(config.get_output_format(), "markdown");
    assert!(!config.get_audio_only());
    Ok(())
}

#[test]
fn test_config_dir_must_be_a_directory() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let file = dir.path().join("plain-file");
    fs::write(&file, "x")?;

    assert!(Config::load_config(file.to_str().unwrap()).is_err());
    Ok(())
}

#[test]
fn test_empty_config_file_keeps_defaults() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("config.yaml"), "")?;

    let config = Config::load_config(dir.path().to_str().unwrap())?;
    assert_eq!(config.get_output_format(), "markdown");
    Ok(())
}

#[test]
fn test_loaded_config_reports_its_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = Config::load_config(dir.path().to_str().unwrap())?;

    let expected = dir.path().join("config.yaml");
    assert_eq!(config.file_path(), expected.to_str());
    assert_eq!(config.dir(), dir.path().to_str());
    Ok(())
}
