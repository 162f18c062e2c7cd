use figment::Jail;
use fieldsync_config::FieldSyncConfig;
use fieldsync_core::enums::SyncPathMode;

#[test]
fn env_enables_sync_flags() {
    Jail::expect_with(|jail| {
        jail.set_env("FIELDSYNC_SYNC__ENABLED", "true");
        jail.set_env("FIELDSYNC_SYNC__AUTO_SYNC_ON_SAVE", "true");

        let config = FieldSyncConfig::load().expect("config loads");
        assert!(config.sync.enabled);
        assert!(config.sync.export_on_save());
        assert!(!config.sync.auto_sync());
        Ok(())
    });
}

#[test]
fn project_toml_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_dir(".fieldsync")?;
        jail.create_file(
            ".fieldsync/config.toml",
            r#"
[sync]
enabled = true
path_mode = "custom"
custom_path = "deploy/fieldsync"
"#,
        )?;

        let config = FieldSyncConfig::load().expect("config loads");
        assert_eq!(config.sync.path_mode, SyncPathMode::Custom);
        assert_eq!(
            config.sync.resolve_root().unwrap(),
            std::path::PathBuf::from("deploy/fieldsync")
        );
        Ok(())
    });
}
