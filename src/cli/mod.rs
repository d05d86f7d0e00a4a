pub mod entry;

use crate::export::ExportFormat;
use crate::ledger::model::{Category, Hotel};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "Virtual360", about = "Hotel facility cost assessment ledger")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Append one area to the assessment
    Add {
        #[arg(long, value_parser = parse_hotel)]
        hotel: Hotel,
        #[arg(long)]
        area: String,
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
        #[arg(long, allow_negative_numbers = true)]
        sqm: f64,
        #[arg(long, value_parser = parse_non_negative)]
        cost_per_sqm: Option<f64>,
    },
    /// Interactive quick-entry loop
    Entry,
    List {
        #[command(flatten)]
        filter: HotelFilterArgs,
    },
    Summary {
        #[command(flatten)]
        filter: HotelFilterArgs,
    },
    /// Replace the assessment with an edited CSV table
    Edit { file: PathBuf },
    Undo,
    Clear {
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    Export {
        #[arg(value_parser = parse_format)]
        format: ExportFormat,
        #[command(flatten)]
        filter: HotelFilterArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    Serve,
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    Doctor,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    Set { key: String, value: String },
    Get { key: String },
}

#[derive(Debug, Clone, clap::Args)]
pub struct HotelFilterArgs {
    /// Hotel to include; repeat for several, `none` for an empty selection.
    /// All hotels when omitted.
    #[arg(long = "hotel", value_name = "HOTEL")]
    pub hotels: Vec<String>,
}

impl HotelFilterArgs {
    pub fn selection(&self) -> anyhow::Result<Vec<Hotel>> {
        if self.hotels.is_empty() {
            return Ok(Hotel::ALL.to_vec());
        }

        self.hotels
            .iter()
            .filter(|raw| !raw.trim().eq_ignore_ascii_case("none"))
            .map(|raw| raw.parse::<Hotel>())
            .collect()
    }
}

fn parse_hotel(raw: &str) -> Result<Hotel, String> {
    raw.parse().map_err(|error: anyhow::Error| error.to_string())
}

fn parse_category(raw: &str) -> Result<Category, String> {
    raw.parse().map_err(|error: anyhow::Error| error.to_string())
}

fn parse_format(raw: &str) -> Result<ExportFormat, String> {
    raw.parse().map_err(|error: anyhow::Error| error.to_string())
}

fn parse_non_negative(raw: &str) -> Result<f64, String> {
    let value = raw
        .parse::<f64>()
        .map_err(|_| format!("not a number: {raw}"))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("must be a non-negative number, got {raw}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_filter_selects_all_hotels() {
        let args = HotelFilterArgs { hotels: Vec::new() };

        assert_eq!(args.selection().unwrap(), Hotel::ALL.to_vec());
    }

    #[test]
    fn none_selects_nothing() {
        let args = HotelFilterArgs {
            hotels: vec!["none".to_string()],
        };

        assert!(args.selection().unwrap().is_empty());
    }

    #[test]
    fn add_command_parses() {
        let cli = Cli::try_parse_from([
            "Virtual360",
            "add",
            "--hotel",
            "EDEN Hotel",
            "--area",
            "Pool Deck",
            "--category",
            "Outdoor",
            "--sqm",
            "120",
        ])
        .unwrap();

        match cli.command {
            Commands::Add {
                hotel,
                category,
                sqm,
                cost_per_sqm,
                ..
            } => {
                assert_eq!(hotel, Hotel::EdenHotel);
                assert_eq!(category, Some(Category::Outdoor));
                assert_eq!(sqm, 120.0);
                assert_eq!(cost_per_sqm, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn negative_unit_cost_is_refused_at_input() {
        let result = Cli::try_parse_from([
            "Virtual360",
            "add",
            "--hotel",
            "thaala",
            "--area",
            "Bar",
            "--sqm",
            "10",
            "--cost-per-sqm",
            "-2",
        ]);

        assert!(result.is_err());
    }
}
