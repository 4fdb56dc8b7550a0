//! nwgd-write-station - write the severe convection station bulletin
//!
//! Samples the short-time severe precipitation and thunderstorm gale products at the
//! stations of the region and writes the fixed-width bulletin.

use anyhow::Context;
use clap::Parser;
use tracing::info;

use nwgd::bulletin::write_station;
use nwgd::config::{Config, StationArgs};
use nwgd::logging::{init_tracing, log_timed_operation};

fn main() -> anyhow::Result<()> {
    let args = StationArgs::parse();
    let config = Config::for_station(&args).context("Configuration error")?;

    init_tracing(&config.log_level);
    info!("Starting nwgd-write-station v{}", env!("CARGO_PKG_VERSION"));

    let request = config
        .station_request(&args)
        .context("Failed to find grid products")?;
    info!(rat = ?request.rat_file, smg = ?request.smg_file, "grid products");

    let path = log_timed_operation("write_station", || {
        write_station(&request, chrono::Local::now().naive_local())
    })
    .with_context(|| format!("Failed to write bulletin for region {}", config.region))?;

    println!("{} 站点文件写入完成", path.display());

    Ok(())
}
