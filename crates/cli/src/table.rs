//! Point-cloud tables (`x`, `y`, `z` columns) in CSV or Parquet via Polars.

use std::fs::{self, File};
use std::path::Path;

use anyhow::{bail, Context, Result};
use hmenv::Vec3;
use polars::df;
use polars::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Csv,
    Parquet,
}

fn format_of(path: &Path) -> Result<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => Ok(Format::Csv),
        Some("parquet") => Ok(Format::Parquet),
        other => bail!(
            "unsupported table extension {:?} for {} (expected .csv or .parquet)",
            other,
            path.display()
        ),
    }
}

pub fn points_frame(points: &[Vec3<f64>]) -> PolarsResult<DataFrame> {
    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    let zs: Vec<f64> = points.iter().map(|p| p.z).collect();
    df!("x" => xs, "y" => ys, "z" => zs)
}

pub fn write_points(path: &Path, points: &[Vec3<f64>]) -> Result<()> {
    let format = format_of(path)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    let mut df = points_frame(points)?;
    let mut file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    match format {
        Format::Csv => {
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut df)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        Format::Parquet => {
            ParquetWriter::new(file)
                .finish(&mut df)
                .with_context(|| format!("writing {}", path.display()))?;
        }
    }
    Ok(())
}

pub fn read_points(path: &Path) -> Result<Vec<Vec3<f64>>> {
    let lf = match format_of(path)? {
        Format::Csv => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(100))
            .finish()?,
        Format::Parquet => LazyFrame::scan_parquet(path, ScanArgsParquet::default())?,
    };
    let df = lf
        .select([col("x"), col("y"), col("z")])
        .collect()
        .with_context(|| format!("reading x/y/z columns from {}", path.display()))?;
    let xs = column_f64(&df, "x")?;
    let ys = column_f64(&df, "y")?;
    let zs = column_f64(&df, "z")?;
    Ok(xs
        .into_iter()
        .zip(ys)
        .zip(zs)
        .map(|((x, y), z)| Vec3::new(x, y, z))
        .collect())
}

fn column_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = df.column(name)?.cast(&DataType::Float64)?;
    series
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| v.with_context(|| format!("null {name} at row {row}")))
        .collect()
}
