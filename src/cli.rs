//! CLI argument parsing for `packweight`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::aggregate::GroupBy;
use crate::config::{AnalysisConfig, BaselineMode, TimeWindow};
use crate::error::{PipelineError, Result};
use crate::validate::parse_timestamp;

/// Output format for the overweight report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Delimited text, one row per group (default)
    Csv,
    /// Summaries, baselines and fit as JSON
    Json,
}

/// Grouping dimension as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupByArg {
    Resource,
    Lot,
    Day,
}

impl From<GroupByArg> for GroupBy {
    fn from(arg: GroupByArg) -> Self {
        match arg {
            GroupByArg::Resource => GroupBy::Resource,
            GroupByArg::Lot => GroupBy::Lot,
            GroupByArg::Day => GroupBy::Day,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "packweight")]
#[command(version)]
#[command(about = "Pack-weight baselines and overweight summaries per resource, lot or day", long_about = None)]
pub struct Cli {
    /// Measurement table (CSV with Resource, LOT, Timestamp, PackWeight columns)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// TOML configuration file; command-line options override its values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Grouping dimension for the overweight summary
    #[arg(short, long = "group-by", value_enum)]
    pub group_by: Option<GroupByArg>,

    /// Restrict the analysis to this resource (repeatable)
    #[arg(short, long = "resource", value_name = "ID")]
    pub resources: Vec<String>,

    /// Start of the inclusive time window (dd/mm/yyyy HH:MM:SS)
    #[arg(long, value_name = "TIMESTAMP", requires = "to")]
    pub from: Option<String>,

    /// End of the inclusive time window (dd/mm/yyyy HH:MM:SS)
    #[arg(long, value_name = "TIMESTAMP", requires = "from")]
    pub to: Option<String>,

    /// Use a fixed target weight instead of the per-resource median
    #[arg(long = "fixed-target", value_name = "WEIGHT")]
    pub fixed_target: Option<f64>,

    /// Keep rows whose lot is 0
    #[arg(long = "keep-unassigned-lot")]
    pub keep_unassigned_lot: bool,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long = "format", value_enum, default_value = "csv")]
    pub format: OutputFormat,

    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Builds the run configuration: the config file (if any) first, then
    /// command-line overrides.
    pub fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::load(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(g) = self.group_by {
            config.group_by = g.into();
        }
        if !self.resources.is_empty() {
            config.resources = Some(self.resources.clone());
        }
        if let (Some(from), Some(to)) = (&self.from, &self.to) {
            config.window = Some(TimeWindow::new(parse_cli_time(from)?, parse_cli_time(to)?)?);
        }
        if let Some(target) = self.fixed_target {
            config.baseline = BaselineMode::Fixed(target);
        }
        if self.keep_unassigned_lot {
            config.skip_unassigned_lot = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_cli_time(text: &str) -> Result<chrono::NaiveDateTime> {
    parse_timestamp(text).ok_or_else(|| {
        PipelineError::InvalidConfig(format!(
            "cannot parse '{text}', expected dd/mm/yyyy HH:MM:SS"
        ))
    })
}
