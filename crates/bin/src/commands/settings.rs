//! Settings command - applies local settings changes.

use profile_sync::Instance;

use crate::cli::{OutputFormat, SettingsArgs};
use crate::output::{print_json, print_table};

/// Run the settings command
pub async fn run(
    instance: &Instance,
    args: &SettingsArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let patch = args.to_patch();
    let settings = if patch.is_empty() {
        instance
            .engine()
            .cached()
            .await
            .map(|p| p.settings)
            .unwrap_or_default()
    } else {
        instance.update_settings(patch).await.settings
    };

    match format {
        OutputFormat::Json => print_json(&settings)?,
        OutputFormat::Human => {
            let value = serde_json::to_value(&settings)?;
            let rows: Vec<Vec<String>> = value
                .as_object()
                .into_iter()
                .flatten()
                .map(|(key, v)| {
                    let v = v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
                    vec![key.clone(), v]
                })
                .collect();
            print_table(&["SETTING", "VALUE"], &rows);
        }
    }
    Ok(())
}
