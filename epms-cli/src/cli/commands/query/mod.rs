//! Collection listing commands

pub mod handler;

use clap::{Args, ValueEnum};
use std::path::PathBuf;

pub use handler::{format_output, handle_list_command, handle_picker_command, handle_metadata_command};

/// Output formats for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Single-line JSON
    JsonCompact,
    Csv,
}

/// How chatty the command is around the results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DisplayStyle {
    /// Results only
    Quiet,
    #[default]
    Normal,
    /// Also print the generated query and timings
    Verbose,
}

/// Options shared by every paged listing
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// Rows per page (defaults to the configured page size)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Field to sort by (defaults to createdAt)
    #[arg(short, long)]
    pub sort: Option<String>,

    /// Sort ascending instead of descending
    #[arg(long)]
    pub asc: bool,

    /// Status filter (order status, vendor status, or true/false for materials)
    #[arg(long)]
    pub status: Option<String>,

    /// Keyword searched across the collection's text fields
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Extra raw OData predicate AND-ed with the other filters
    #[arg(long)]
    pub filter: Option<String>,

    /// Print the OData query instead of sending it
    #[arg(long)]
    pub dry: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Where and how results are written
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[arg(long, value_enum, default_value_t = DisplayStyle::Normal)]
    pub style: DisplayStyle,

    /// Write results to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Picker source collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PickerSource {
    Vendors,
    Materials,
    /// Vendors and materials, loaded concurrently
    All,
}

#[derive(Debug, Clone, Args)]
pub struct PickerArgs {
    #[arg(value_enum)]
    pub source: PickerSource,

    /// Raw OData predicate replacing the active-only filter (vendors or
    /// materials only)
    #[arg(long)]
    pub filter: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Clone, Args)]
pub struct MetadataArgs {
    /// Print the raw EDMX document instead of the entity set list
    #[arg(long)]
    pub raw: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}
