use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Days, Utc};
use clima_core::DateRange;
use clima_fetch::FileSource;

#[tokio::main]
async fn main() -> Result<()> {
    // Observability
    clima_obs::init("clima");

    // Config
    let cfg = clima_config::AppConfig::load().context("loading configuration")?;
    if cfg.cities.is_empty() {
        anyhow::bail!("no cities configured; add [[cities]] entries to config.toml");
    }

    let today = Utc::now().date_naive();
    let start = today - Days::new(cfg.fetch.history_days);
    let range = DateRange::new(start, today).context("building analysis range")?;

    let source = Arc::new(FileSource::new(&cfg.fetch.data_dir));
    let cities: Vec<String> = cfg.cities.iter().map(|c| c.name.clone()).collect();

    tracing::info!(cities = cities.len(), %range, "starting analysis run");
    let all = clima_cli::load_series(source, &cities, range).await?;

    for series in &all {
        println!("{}", clima_cli::city_report(series, &cfg.analysis));
    }
    println!("{}", clima_cli::comparison_report(&all));

    let written = clima_cli::export_tables(&cfg.export_dir, &all, &cfg.analysis)?;
    println!("Exported {} tables to {}/", written.len(), cfg.export_dir);

    Ok(())
}
