use std::{fs::File, io::Read, path::Path};

use tracing::info;

use crate::{
    data::record::{DataBundle, QuintileReference, Record},
    foundation::error::{WaterfallError, WaterfallResult},
};

#[derive(Debug, serde::Deserialize)]
struct JobStatsRow {
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Job Growth, 2010-2012")]
    job_growth: f64,
    #[serde(rename = "Average Annual Wage ($)")]
    avg_wage: f64,
    #[serde(rename = "Average Wage Quintile")]
    quintile: f64,
    #[serde(rename = "Average Annual Wage Growth ($M)")]
    avg_wage_growth: f64,
}

#[derive(Debug, serde::Deserialize)]
struct QuintileRow {
    #[serde(rename = "Quintile")]
    quintile: f64,
    #[serde(rename = "Income")]
    income: f64,
    #[serde(rename = "Net Annual Wage Growth ($M)")]
    net_wage_growth: f64,
}

fn integral(v: f64, what: &str, line: usize) -> WaterfallResult<i64> {
    if !v.is_finite() || v.fract() != 0.0 {
        return Err(WaterfallError::data_load(format!(
            "{what} row {line}: quintile must be an integer, got {v}"
        )));
    }
    Ok(v as i64)
}

fn reader<R: Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(rdr)
}

/// Parse the job statistics dataset.
pub fn read_job_stats<R: Read>(rdr: R) -> WaterfallResult<Vec<Record>> {
    let mut rows = Vec::new();
    for (i, result) in reader(rdr).deserialize::<JobStatsRow>().enumerate() {
        let row = result
            .map_err(|e| WaterfallError::data_load(format!("job stats row {}: {e}", i + 1)))?;
        rows.push(Record {
            quintile: integral(row.quintile, "job stats", i + 1)?,
            category: row.category,
            job_growth: row.job_growth,
            avg_wage: row.avg_wage,
            avg_wage_growth: row.avg_wage_growth,
        });
    }
    Ok(rows)
}

/// Parse the income-quintile reference dataset.
pub fn read_quintiles<R: Read>(rdr: R) -> WaterfallResult<Vec<QuintileReference>> {
    let mut rows = Vec::new();
    for (i, result) in reader(rdr).deserialize::<QuintileRow>().enumerate() {
        let row = result
            .map_err(|e| WaterfallError::data_load(format!("quintiles row {}: {e}", i + 1)))?;
        rows.push(QuintileReference {
            quintile: integral(row.quintile, "quintiles", i + 1)?,
            income: row.income,
            net_wage_growth: row.net_wage_growth,
        });
    }
    Ok(rows)
}

fn open(path: &Path) -> WaterfallResult<File> {
    File::open(path)
        .map_err(|e| WaterfallError::data_load(format!("open '{}': {e}", path.display())))
}

/// Load both datasets. Either one failing fails the whole bundle.
pub fn load_bundle(jobs_path: &Path, quintiles_path: &Path) -> WaterfallResult<DataBundle> {
    info!(jobs = %jobs_path.display(), quintiles = %quintiles_path.display(), "requesting data");

    let stats = read_job_stats(open(jobs_path)?).map_err(|e| with_path(e, jobs_path))?;
    info!("done retrieving and parsing {} job stats rows", stats.len());

    let quintiles =
        read_quintiles(open(quintiles_path)?).map_err(|e| with_path(e, quintiles_path))?;
    info!("done retrieving and parsing {} quintile rows", quintiles.len());

    Ok(DataBundle { stats, quintiles })
}

fn with_path(err: WaterfallError, path: &Path) -> WaterfallError {
    match err {
        WaterfallError::DataLoad(msg) => {
            WaterfallError::data_load(format!("{}: {msg}", path.display()))
        }
        other => other,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/data/load.rs"]
mod tests;
