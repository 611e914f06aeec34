//! Chart config (JSON) and dataset (CSV) files.

use crate::annotations::AnnotationsConfig;
use crate::arrows::{ArrowConfig, LayoutOptions};
use crate::chart::Orientation;
use crate::models::{DataRow, Series};
use crate::totals::TotalConfig;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

fn default_locale() -> String {
    "en".to_string()
}

/// A whole waterfall document: data, annotations and presentation flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub series: Vec<Series>,
    #[serde(default)]
    pub arrows: Vec<ArrowConfig>,
    #[serde(default)]
    pub totals: Vec<TotalConfig>,
    #[serde(default)]
    pub layout: LayoutOptions,
    #[serde(default)]
    pub vertical: bool,
    #[serde(default)]
    pub y_inverted: bool,
    #[serde(default)]
    pub x_inverted: bool,
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: None,
            series: Vec::new(),
            arrows: Vec::new(),
            totals: Vec::new(),
            layout: LayoutOptions::default(),
            vertical: false,
            y_inverted: false,
            x_inverted: false,
            locale: default_locale(),
        }
    }
}

impl ChartConfig {
    pub fn orientation(&self) -> Orientation {
        Orientation {
            vertical: self.vertical,
            y_inverted: self.y_inverted,
            x_inverted: self.x_inverted,
        }
    }

    pub fn annotations(&self) -> AnnotationsConfig {
        AnnotationsConfig {
            arrows: self.arrows.clone(),
            totals: self.totals.clone(),
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ChartConfig> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open config {}", path.display()))?;
    let cfg = serde_json::from_reader(file)
        .with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

/// Save a config as pretty JSON.
pub fn save_config<P: AsRef<Path>>(cfg: &ChartConfig, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(cfg)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    series: String,
    x: String,
    value: Option<f64>,
}

/// Read `series,x,value` rows; series are created in first-seen order.
pub fn load_series_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Series>> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("open dataset {}", path.display()))?;
    let mut out: Vec<Series> = Vec::new();
    for (line, rec) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = rec.with_context(|| format!("{}: bad row {}", path.display(), line + 2))?;
        let data = DataRow {
            x: row.x,
            value: row.value,
        };
        match out.iter_mut().find(|s| s.name == row.series) {
            Some(s) => s.data.push(data),
            None => out.push(Series::new(row.series, vec![data])),
        }
    }
    Ok(out)
}

/// Write datasets as `series,x,value` CSV with header.
pub fn save_series_csv<P: AsRef<Path>>(series: &[Series], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    for s in series {
        for row in &s.data {
            wtr.serialize(CsvRow {
                series: s.name.clone(),
                x: row.x.clone(),
                value: row.value,
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn csv_groups_rows_by_series() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("d.csv");
        std::fs::write(&p, "series,x,value\nsales,Q1,10\ncosts,Q1,-4\nsales,Q2,\n").unwrap();
        let s = load_series_csv(&p).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].name, "sales");
        assert_eq!(s[0].data[1], DataRow::missing("Q2"));
        assert_eq!(s[1].data[0], DataRow::new("Q1", -4.0));
    }

    #[test]
    fn config_defaults() {
        let cfg: ChartConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.locale, "en");
        assert_eq!(cfg.layout.minimal_gap, 15.0);
        assert!(!cfg.orientation().vertical);
    }
}
