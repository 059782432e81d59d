//! Throttle command - shows the remote request cooldown.

use profile_sync::{Instance, clock::format_millis};

use crate::cli::OutputFormat;
use crate::output::{print_json, print_table};

/// Run the throttle command
pub async fn run(instance: &Instance, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let throttle = instance.engine().throttle();
    let last = instance.last_remote_contact().await;
    let remaining = throttle.remaining().await;
    let cooldown = throttle.cooldown();

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "lastRequestAt": last,
            "cooldownMs": cooldown.as_millis() as u64,
            "remainingMs": remaining.as_millis() as u64,
            "canRequest": remaining.is_zero(),
        }))?,
        OutputFormat::Human => {
            let last = last.map(format_millis).unwrap_or_else(|| "never".to_string());
            print_table(
                &["FIELD", "VALUE"],
                &[
                    vec!["last request".to_string(), last],
                    vec!["cooldown".to_string(), format!("{}s", cooldown.as_secs())],
                    vec!["remaining".to_string(), format!("{}s", remaining.as_secs())],
                ],
            );
        }
    }
    Ok(())
}
