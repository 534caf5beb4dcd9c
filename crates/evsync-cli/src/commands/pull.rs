// `evsync pull`: export broker events for one date

use chrono::NaiveDate;
use evsync_core::orion::OrionClient;
use evsync_core::pull::{self, FetchStrategy};
use evsync_core::SyncConfig;

const USAGE: &str = "usage: evsync pull YYYY-MM-DD";

pub async fn run(date: Option<String>, strategy: &str, to_stdout: bool) -> anyhow::Result<()> {
    let Some(date_arg) = date else {
        eprintln!("{USAGE}");
        std::process::exit(1);
    };
    let Ok(date) = NaiveDate::parse_from_str(&date_arg, "%Y-%m-%d") else {
        eprintln!("invalid date {date_arg:?}");
        eprintln!("{USAGE}");
        std::process::exit(1);
    };
    let strategy = match strategy {
        "client" => FetchStrategy::ClientFilter,
        _ => FetchStrategy::ServerFilter,
    };

    let config = SyncConfig::from_env()?;
    let client = OrionClient::new(&config);
    let events = pull::run(&client, date, strategy).await?;

    // serde_json leaves non-ASCII unescaped, so the display labels come
    // out readable in both the file and stdout forms
    let json = serde_json::to_string_pretty(&events)?;
    if to_stdout {
        println!("{json}");
    } else {
        println!("Retrieved {} events from FIWARE Orion.", events.len());
        let filename = format!("events_{date_arg}.json");
        std::fs::write(&filename, json)?;
        println!("Wrote event data to '{filename}'.");
    }
    Ok(())
}
