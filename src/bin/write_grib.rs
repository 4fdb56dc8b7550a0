//! nwgd-write-grib - patch a local forecast into the national GRIB2 template
//!
//! Reads the local forecast from a raw little-endian `f32` file and writes the
//! grid product named after the bulletin conventions.

use anyhow::Context;
use clap::Parser;
use tracing::info;

use nwgd::config::{Config, GribArgs};
use nwgd::logging::{init_tracing, log_timed_operation};
use nwgd::rewrite::write_grib;

fn main() -> anyhow::Result<()> {
    let args = GribArgs::parse();
    let config = Config::for_grib(&args).context("Configuration error")?;

    init_tracing(&config.log_level);
    info!("Starting nwgd-write-grib v{}", env!("CARGO_PKG_VERSION"));

    let request = config
        .rewrite_request(&args)
        .with_context(|| format!("Failed to read local forecast {:?}", args.data_file))?;

    let path = log_timed_operation("write_grib", || {
        write_grib(&request, chrono::Local::now().naive_local())
    })
    .with_context(|| format!("Failed to write {} product", args.variable))?;

    println!("{} 文件写入完成", path.display());

    Ok(())
}
