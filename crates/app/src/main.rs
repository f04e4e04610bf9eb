use std::path::PathBuf;

use anyhow::{Context, bail};

use weddingdesk_app::{WeddingDesk, WeddingDeskConfig};
use weddingdesk_core::WeddingId;

const USAGE: &str = "usage: weddingdesk import <wedding-id> <csv-path>";

fn main() -> anyhow::Result<()> {
    let config = WeddingDeskConfig::from_env();
    weddingdesk_observability::init(&config.log);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (wedding_id, path) = match args.as_slice() {
        [command, wedding_id, path] if command == "import" => {
            let wedding_id: WeddingId = wedding_id.parse().context("invalid wedding id")?;
            (wedding_id, PathBuf::from(path))
        }
        _ => bail!(USAGE),
    };

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let desk = WeddingDesk::new(&config);
    let summary = desk
        .importer()
        .import(&wedding_id, &text)
        .with_context(|| format!("cannot import {}", path.display()))?;

    tracing::info!(
        wedding_id = %wedding_id,
        guests_created = summary.guests_created,
        households_created = summary.households_created,
        errors = summary.errors.len(),
        "import finished"
    );

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
