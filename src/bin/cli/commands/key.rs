use anyhow::Result;

use studywell_lib::encryption::{init_master_key, MASTER_KEY_ENV};

use crate::OutputFormat;

pub fn run_check(format: &OutputFormat) -> Result<()> {
    let keys = init_master_key()?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "source": keys.source(),
                "fingerprint": keys.fingerprint(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{} resolved ({:?})", MASTER_KEY_ENV, keys.source());
            println!("  Key ID: {}", keys.fingerprint());
        }
    }

    Ok(())
}
