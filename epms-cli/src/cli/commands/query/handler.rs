//! Listing, picker and metadata command handlers

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::time::Instant;

use super::{DisplayStyle, ListArgs, MetadataArgs, OutputArgs, OutputFormat, PickerArgs, PickerSource};
use crate::api::constants::ODATA_BASE;
use crate::api::models::PoStatus;
use crate::api::query::{CollectionSpec, Filter, OrderBy, QueryRequest, QueryResult, build_odata_query};
use crate::api::{ApiError, ProcurementApi};
use crate::cli::commands::{ensure_access, ensure_signed_in};
use crate::config::Config;
use crate::navigation::Route;

/// Paged listing targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTarget {
    /// The signed-in employee's purchase orders
    Orders,
    /// Purchase orders awaiting a manager's decision
    Approvals,
    Vendors,
    Materials,
}

impl ListTarget {
    pub fn route(&self) -> Route {
        match self {
            Self::Orders => Route::MyOrders,
            Self::Approvals => Route::Approvals,
            Self::Vendors => Route::Vendors,
            Self::Materials => Route::Materials,
        }
    }

    /// Status applied when the user does not pick one
    pub fn default_status(&self) -> Option<&'static str> {
        match self {
            Self::Approvals => Some(PoStatus::Pending.as_str()),
            _ => None,
        }
    }

    fn spec<'a>(&self, api: &'a ProcurementApi) -> &'a CollectionSpec {
        match self {
            Self::Orders | Self::Approvals => api.orders().spec(),
            Self::Vendors => api.vendors().spec(),
            Self::Materials => api.materials().spec(),
        }
    }

    fn columns(&self) -> &'static [Column] {
        match self {
            Self::Orders | Self::Approvals => ORDER_COLUMNS,
            Self::Vendors => VENDOR_COLUMNS,
            Self::Materials => MATERIAL_COLUMNS,
        }
    }
}

/// A table column: heading plus the row key it reads
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub header: &'static str,
    pub key: &'static str,
    pub render: fn(&Value) -> String,
}

impl Column {
    const fn new(header: &'static str, key: &'static str) -> Self {
        Self {
            header,
            key,
            render: json_value_to_string,
        }
    }

    const fn rendered(header: &'static str, key: &'static str, render: fn(&Value) -> String) -> Self {
        Self { header, key, render }
    }
}

const ORDER_COLUMNS: &[Column] = &[
    Column::new("PO Number", "poNumber"),
    Column::new("Vendor", "vendorName"),
    Column::rendered("Status", "status", render_po_status),
    Column::new("Total", "grandTotal"),
    Column::new("Currency", "currency"),
    Column::new("Order Date", "orderDate"),
    Column::new("Items", "itemCount"),
];

const VENDOR_COLUMNS: &[Column] = &[
    Column::new("Code", "vendorCode"),
    Column::new("Name", "name"),
    Column::new("Category", "category"),
    Column::new("Contact", "contactPerson"),
    Column::new("Email", "email"),
    Column::new("Rating", "rating"),
    Column::new("Status", "status"),
];

const MATERIAL_COLUMNS: &[Column] = &[
    Column::new("Code", "materialCode"),
    Column::new("Description", "description"),
    Column::new("Type", "materialType"),
    Column::new("Unit", "unit"),
    Column::new("Base Price", "basePrice"),
    Column::new("Currency", "currency"),
    Column::new("Active", "isActive"),
];

const ENTITY_SET_COLUMNS: &[Column] = &[
    Column::new("Entity Set", "name"),
    Column::new("Entity Type", "entity_type"),
];

/// Translate listing flags into a query request
pub fn build_request(args: &ListArgs, target: ListTarget, spec: &CollectionSpec, default_page_size: u32) -> QueryRequest {
    let mut builder = QueryRequest::builder()
        .page(args.page)
        .page_size(args.page_size.unwrap_or(default_page_size));

    let sort_field = args
        .sort
        .as_deref()
        .map(str::trim)
        .filter(|field| !field.is_empty());
    match (sort_field, args.asc) {
        (Some(field), true) => builder = builder.sort(OrderBy::asc(field)),
        (Some(field), false) => builder = builder.sort(OrderBy::desc(field)),
        (None, true) => builder = builder.sort(OrderBy::asc(spec.default_order.field.clone())),
        (None, false) => {}
    }

    if let Some(status) = args.status.as_deref().or(target.default_status()) {
        builder = builder.status(status);
    }
    if let Some(ref keyword) = args.keyword {
        builder = builder.keyword(keyword.clone());
    }
    if let Some(expression) = args.filter.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        builder = builder.custom_filter(Filter::raw(expression));
    }

    builder.build()
}

/// Handle `orders`, `approvals`, `vendors` and `materials`
pub async fn handle_list_command(
    api: &ProcurementApi,
    config: &Config,
    target: ListTarget,
    args: ListArgs,
) -> Result<()> {
    ensure_access(&api.auth().session(), target.route())?;

    let spec = target.spec(api);
    let request = build_request(&args, target, spec, config.default_page_size);
    let options = build_odata_query(&request, spec);
    let path = format!("{}/{}", ODATA_BASE, spec.entity_set);

    let verbose = matches!(args.output.style, DisplayStyle::Verbose);
    if verbose || args.dry {
        for (name, value) in options.params() {
            eprintln!("{} {}", format!("{}:", name).dimmed(), value);
        }
    }

    if args.dry {
        println!("GET {}{}", api.client().url(&path), options);
        return Ok(());
    }

    let start = Instant::now();
    let (rows, total) = match target {
        ListTarget::Orders | ListTarget::Approvals => rows_of(api.orders().query(&request).await)?,
        ListTarget::Vendors => rows_of(api.vendors().query(&request).await)?,
        ListTarget::Materials => rows_of(api.materials().query(&request).await)?,
    };
    if verbose {
        eprintln!(
            "Execution time: {:.2}ms",
            start.elapsed().as_secs_f64() * 1000.0
        );
    }

    let formatted = format_output(&rows, target.columns(), args.output.format)?;
    let footer = page_footer(&request, total, rows_len(&rows));
    write_output(&args.output, &formatted, Some(&footer))
}

/// Handle `picker`
pub async fn handle_picker_command(api: &ProcurementApi, args: PickerArgs) -> Result<()> {
    let predicate = picker_predicate(&args)?;
    let predicate = predicate.as_ref();
    ensure_access(&api.auth().session(), Route::PurchaseOrderDetail)?;

    match args.source {
        PickerSource::Vendors => {
            let rows = to_rows(&api.vendors().list_all_for_selection(predicate).await?)?;
            let formatted = format_output(&rows, VENDOR_COLUMNS, args.output.format)?;
            write_output(&args.output, &formatted, None)
        }
        PickerSource::Materials => {
            let rows = to_rows(&api.materials().list_all_for_selection(predicate).await?)?;
            let formatted = format_output(&rows, MATERIAL_COLUMNS, args.output.format)?;
            write_output(&args.output, &formatted, None)
        }
        PickerSource::All => {
            let (vendors, materials) = futures::try_join!(
                api.vendors().list_all_for_selection(predicate),
                api.materials().list_all_for_selection(predicate),
            )?;
            let vendors = to_rows(&vendors)?;
            let materials = to_rows(&materials)?;

            let formatted = match args.output.format {
                OutputFormat::Table => format!(
                    "{}\n{}\n{}\n{}",
                    "Vendors".bold().underline(),
                    format_output(&vendors, VENDOR_COLUMNS, OutputFormat::Table)?,
                    "Materials".bold().underline(),
                    format_output(&materials, MATERIAL_COLUMNS, OutputFormat::Table)?
                ),
                OutputFormat::Csv => anyhow::bail!(
                    "CSV output needs a single collection; pick vendors or materials"
                ),
                format => {
                    let mut combined = Map::new();
                    combined.insert("vendors".to_string(), vendors);
                    combined.insert("materials".to_string(), materials);
                    format_output(&Value::Object(combined), &[], format)?
                }
            };
            write_output(&args.output, &formatted, None)
        }
    }
}

/// Raw predicate replacing the picker's active-only filter. Vendors and
/// materials share no fields, so one predicate cannot serve both.
fn picker_predicate(args: &PickerArgs) -> Result<Option<Filter>> {
    let predicate = args
        .filter
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(Filter::raw);
    if predicate.is_some() && args.source == PickerSource::All {
        anyhow::bail!("--filter needs a single collection; pick vendors or materials");
    }
    Ok(predicate)
}

/// Handle `metadata`
pub async fn handle_metadata_command(api: &ProcurementApi, args: MetadataArgs) -> Result<()> {
    ensure_signed_in(&api.auth().session())?;

    if args.raw {
        let edmx = api.metadata().await?;
        return write_output(&args.output, &edmx, None);
    }

    let sets = api.entity_sets().await?;
    let rows = to_rows(&sets)?;
    let formatted = format_output(&rows, ENTITY_SET_COLUMNS, args.output.format)?;
    write_output(&args.output, &formatted, None)
}

fn rows_of<T: Serialize>(result: Result<QueryResult<T>, ApiError>) -> Result<(Value, u64)> {
    let result = result?;
    Ok((to_rows(&result.rows)?, result.total))
}

fn to_rows<T: Serialize>(rows: &[T]) -> Result<Value> {
    serde_json::to_value(rows).context("Failed to serialize rows")
}

fn rows_len(rows: &Value) -> usize {
    rows.as_array().map(Vec::len).unwrap_or(0)
}

fn page_footer(request: &QueryRequest, total: u64, shown: usize) -> String {
    let page_size = u64::from(request.effective_page_size());
    let pages = total.div_ceil(page_size).max(1);
    format!(
        "Page {} of {} ({} shown, {} total)",
        request.effective_page(),
        pages,
        shown,
        total
    )
}

fn write_output(output: &OutputArgs, formatted: &str, footer: Option<&str>) -> Result<()> {
    if let Some(ref path) = output.output {
        fs::write(path, formatted)
            .with_context(|| format!("Failed to write output to: {}", path.display()))?;
        if !matches!(output.style, DisplayStyle::Quiet) {
            eprintln!(
                "Results saved to: {}",
                path.display().to_string().bright_green()
            );
        }
        return Ok(());
    }

    println!("{}", formatted);
    let show_footer = output.format == OutputFormat::Table && !matches!(output.style, DisplayStyle::Quiet);
    if let (Some(footer), true) = (footer, show_footer) {
        println!("{}", footer.dimmed());
    }
    Ok(())
}

/// Format rows according to the requested output format
pub fn format_output(data: &Value, columns: &[Column], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(data).context("Failed to format JSON output"),
        OutputFormat::JsonCompact => serde_json::to_string(data).context("Failed to format JSON output"),
        OutputFormat::Csv => json_to_csv(data),
        OutputFormat::Table => Ok(json_to_table(data, columns)),
    }
}

/// Rows to CSV; headers come from the first row
fn json_to_csv(data: &Value) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    match data {
        Value::Array(rows) => {
            let Some(Value::Object(first)) = rows.first() else {
                return Ok(String::new());
            };
            let headers: Vec<&String> = first.keys().collect();
            writer.write_record(&headers).context("Failed to write CSV header")?;

            for row in rows {
                let Value::Object(obj) = row else { continue };
                let record: Vec<String> = headers
                    .iter()
                    .map(|h| csv_cell(obj.get(h.as_str()).unwrap_or(&Value::Null)))
                    .collect();
                writer.write_record(&record).context("Failed to write CSV row")?;
            }
        }
        Value::Object(obj) => {
            writer.write_record(["key", "value"]).context("Failed to write CSV header")?;
            for (key, value) in obj {
                writer
                    .write_record([key.as_str(), &csv_cell(value)])
                    .context("Failed to write CSV row")?;
            }
        }
        other => {
            writer.write_record(["value"]).context("Failed to write CSV header")?;
            writer.write_record([csv_cell(other)]).context("Failed to write CSV row")?;
        }
    }

    let bytes = writer.into_inner().context("Failed to flush CSV output")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Nulls become empty cells in CSV
fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => json_value_to_string(other),
    }
}

/// Rows to aligned columns with a bold heading line
fn json_to_table(data: &Value, columns: &[Column]) -> String {
    let rows: Vec<&Map<String, Value>> = match data {
        Value::Array(rows) => rows.iter().filter_map(Value::as_object).collect(),
        Value::Object(obj) => vec![obj],
        _ => Vec::new(),
    };
    if rows.is_empty() {
        return "No data".dimmed().to_string();
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| match row.get(column.key) {
                    None | Some(Value::Null) => "-".to_string(),
                    Some(value) => (column.render)(value),
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column.header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(cells.len() + 1);
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(column, width)| format!("{:<width$}", column.header, width = *width))
        .collect();
    lines.push(header.join("  ").bold().to_string());

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        lines.push(line.join("  ").trim_end().to_string());
    }

    lines.join("\n")
}

fn render_po_status(value: &Value) -> String {
    let raw = json_value_to_string(value);
    match PoStatus::parse(&raw) {
        Some(status) => status.label().to_string(),
        None => raw,
    }
}

/// Convert a JSON value to a string representation
fn json_value_to_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
