//! File names of the NWGD bulletin products
//!
//! Grid products are named
//! `Z_NWGD_C_{region}_{production time}_P_OGFP_SPFC-{VAR}_{issue time}_{tag}.GRB2`,
//! station products `Z_NWGD_C_{region}_{production time}_P_OGFP-SPFC-STA-{issue time}-02401.txt`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;

use crate::{
    errors::{Error, Result},
    ForecastVariable,
};

const PRODUCTION_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Name of the grid product for `variable` issued at `sdate` (`YYYYmmddHHMM`).
pub fn grid_file_name(
    region: &str,
    now: NaiveDateTime,
    variable: ForecastVariable,
    sdate: &str,
) -> String {
    format!(
        "Z_NWGD_C_{region}_{}_P_OGFP_SPFC-{}_{sdate}_{}.GRB2",
        now.format(PRODUCTION_TIME_FORMAT),
        variable.code(),
        variable.file_tag()
    )
}

/// Pattern of the national template file for `variable`.
pub fn template_pattern(variable: ForecastVariable) -> String {
    format!("Z_NWGD_C_BECS_*_P_OGFP_SPFC-{}_*_*.GRB2", variable.code())
}

/// Pattern of a produced grid file for `variable`.
pub fn grid_file_pattern(variable: ForecastVariable) -> String {
    format!("*-{}_*.GRB2", variable.code())
}

/// Name of the station bulletin, `issue` being the Beijing time of the forecast cycle.
pub fn station_file_name(region: &str, now: NaiveDateTime, issue: NaiveDateTime) -> String {
    format!(
        "Z_NWGD_C_{region}_{}_P_OGFP-SPFC-STA-{}-02401.txt",
        now.format(PRODUCTION_TIME_FORMAT),
        issue.format("%Y%m%d%H%M")
    )
}

/// Template file for `variable` in `sample_dir`.
pub fn find_template(sample_dir: &Path, variable: ForecastVariable) -> Result<PathBuf> {
    let pattern = template_pattern(variable);

    find_first(sample_dir, &pattern)?.ok_or_else(|| Error::TemplateNotFound {
        dir: sample_dir.to_path_buf(),
        pattern,
    })
}

/// Grid product for `variable` in `source_dir`.
pub fn find_grid_file(source_dir: &Path, variable: ForecastVariable) -> Result<PathBuf> {
    let pattern = grid_file_pattern(variable);

    find_first(source_dir, &pattern)?.ok_or_else(|| Error::GridFileNotFound {
        dir: source_dir.to_path_buf(),
        pattern,
    })
}

/// First file in `dir`, by name, matching `pattern`.
fn find_first(dir: &Path, pattern: &str) -> Result<Option<PathBuf>> {
    let mut names = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        // follows symlinks, dangling links are skipped
        if !entry.path().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if wildcard_match(pattern.as_bytes(), name.as_bytes()) {
                names.push(name.to_owned());
            }
        }
    }

    names.sort();

    Ok(names.into_iter().next().map(|name| dir.join(name)))
}

/// Matches `name` against `pattern` where `*` stands for any run of characters.
fn wildcard_match(pattern: &[u8], name: &[u8]) -> bool {
    match pattern.split_first() {
        None => name.is_empty(),
        Some((b'*', rest)) => (0..=name.len()).any(|skip| wildcard_match(rest, &name[skip..])),
        Some((&c, rest)) => name.first() == Some(&c) && wildcard_match(rest, &name[1..]),
    }
}
