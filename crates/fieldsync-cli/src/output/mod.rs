use serde::Serialize;

use crate::cli::OutputFormat;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use fieldsync_core::enums::SyncState;
    use fieldsync_core::responses::GroupStatus;

    use pretty_assertions::assert_eq;

    use super::render;
    use crate::cli::OutputFormat;

    #[test]
    fn json_render_is_valid_json() {
        let status = GroupStatus::new("specs", SyncState::NeedPush);
        let out = render(&status, OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["slug"], "specs");
        assert_eq!(parsed["state"], "need_push");
        assert_eq!(parsed["action"], "push");
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let status = GroupStatus::new("specs", SyncState::Synced);
        let out = render(&status, OutputFormat::Raw).expect("raw render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["state"], "synced");
        assert!(!out.contains('\n'));
    }
}
