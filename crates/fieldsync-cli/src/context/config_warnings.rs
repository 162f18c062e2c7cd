use fieldsync_config::FieldSyncConfig;

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &FieldSyncConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &FieldSyncConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if !config.sync.enabled && has_single_underscore_key(&env_keys, "FIELDSYNC_SYNC") {
        warnings.push(
            "Sync is disabled while FIELDSYNC_SYNC_* env vars exist. Use double underscores (example: FIELDSYNC_SYNC__ENABLED)."
                .to_string(),
        );
    }

    if config.general.db_path == FieldSyncConfig::default().general.db_path
        && has_single_underscore_key(&env_keys, "FIELDSYNC_GENERAL")
    {
        warnings.push(
            "Store path appears default while FIELDSYNC_GENERAL_* env vars exist. Use double underscores (example: FIELDSYNC_GENERAL__DB_PATH)."
                .to_string(),
        );
    }

    warnings
}

fn has_single_underscore_key(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| {
        key.strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('_') && !rest.starts_with("__"))
    })
}

#[cfg(test)]
mod tests {
    use fieldsync_config::{FieldSyncConfig, SyncConfig};

    use super::collect_unconfigured_warnings;

    #[test]
    fn warns_for_single_underscore_keys() {
        let config = FieldSyncConfig::default();
        let warnings = collect_unconfigured_warnings(
            &config,
            vec![
                ("FIELDSYNC_SYNC_ENABLED".to_string(), "true".to_string()),
                ("FIELDSYNC_GENERAL_DB_PATH".to_string(), "x.db".to_string()),
            ],
        );
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn does_not_warn_for_well_formed_keys() {
        let config = FieldSyncConfig {
            sync: SyncConfig {
                enabled: true,
                ..SyncConfig::default()
            },
            ..FieldSyncConfig::default()
        };
        let warnings = collect_unconfigured_warnings(
            &config,
            vec![
                ("FIELDSYNC_SYNC__ENABLED".to_string(), "true".to_string()),
                ("FIELDSYNC_GENERAL__DB_PATH".to_string(), "x.db".to_string()),
            ],
        );
        assert!(warnings.is_empty());
    }
}
