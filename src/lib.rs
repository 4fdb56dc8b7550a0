//!# Local forecast tools for the NWGD grid bulletins
//!
//!This crate patches local forecasts into the national GRIB2 templates of the
//!NWGD (national weather grid) bulletins and samples the produced severe convection
//!grids at station locations to write the fixed-width station bulletin.
//!
//!GRIB encoding and decoding as well as the nearest gridpoint search are delegated to the
//![ecCodes](https://confluence.ecmwf.int/display/ECC/ecCodes+Home) library, accessed through
//!the safe layer in this crate ([`GribFile`], [`GribMessage`], [`NearestLookup`]).
//!
//!## Usage
//!
//!### Grid products
//!
//!A local forecast is an array indexed `(step, lat, lon)` covering an [`Extent`](grid::Extent)
//!at a fixed spacing (0.01° by default). [`write_grib()`](rewrite::write_grib) takes the
//!national template of the variable, overwrites the values inside the extent for every step,
//!rewrites the issue time keys and saves the product under the bulletin name:
//!
//!```no_run
//!# use nwgd::{grid::Extent, rewrite::{write_grib, RewriteRequest}, ForecastVariable};
//!# use ndarray::Array3;
//!# fn run() -> nwgd::errors::Result<()> {
//!let data = Array3::<f64>::ones((1, 201, 201)).into_dyn();
//!let request = RewriteRequest::new(
//!    "202403192000",
//!    data,
//!    ForecastVariable::Tmax,
//!    Extent::new(26.0, 28.0, 110.0, 112.0),
//!    "CCCC",
//!    "./sample",
//!    "./output",
//!);
//!
//!let path = write_grib(&request, chrono::Local::now().naive_local())?;
//!# Ok(())
//!# }
//!```
//!
//!### Station bulletin
//!
//![`write_station()`](bulletin::write_station) reads the short-time severe precipitation (`RAT`)
//!and thunderstorm gale (`SMG`) products, takes the value of the gridpoint nearest to each
//!station, turns it into a presence flag and writes the bulletin of the region.
//!
//!### Reading GRIB files
//!
//!```no_run
//!# use nwgd::{FallibleIterator, GribFile, KeyRead};
//!# fn run() -> Result<(), nwgd::errors::CodesError> {
//!let mut file = GribFile::open("./output/product.GRB2")?;
//!let mut messages = file.messages();
//!
//!while let Some(msg) = messages.next()? {
//!    let step: i64 = msg.read_key("forecastTime")?;
//!    let nearest = msg.nearest()?.closest(28.2117, 113.1972)?;
//!    println!("{step}: {}", nearest.value);
//!}
//!# Ok(())
//!# }
//!```
//!
//!### ecCodes installation
//!
//!This crate uses [eccodes-sys](https://crates.io/crates/eccodes-sys) to link ecCodes.
//!The recommended way to install ecCodes is using your package manager,
//!for example on Ubuntu:
//!
//!```bash
//!$ sudo apt-get install libeccodes-dev
//!```
//!
//!Tests build their GRIB fixtures from the `regular_ll_sfc_grib2` sample,
//!so the ecCodes samples must be installed as well.
//!
//!### Features
//!
//!- `docs` - builds the crate without linking ecCodes, particularly useful when building the documentation
//!on [docs.rs](https://docs.rs/). For more details check documentation of [eccodes-sys](https://crates.io/crates/eccodes-sys).
//!

pub mod bulletin;
pub mod codes_file;
pub mod codes_message;
pub mod codes_nearest;
pub mod config;
pub mod errors;
pub mod extract;
pub mod grid;
mod intermediate_bindings;
pub mod logging;
pub mod naming;
mod pointer_guard;
pub mod rewrite;
pub mod stations;
pub mod variable;

#[cfg(test)]
mod test_support;

pub use codes_file::{GribFile, MessageIter};
pub use codes_message::{GribMessage, GridField, KeyRead, KeyWrite};
pub use codes_nearest::{NearestGridpoint, NearestLookup};
pub use fallible_iterator::FallibleIterator;
pub use variable::ForecastVariable;
