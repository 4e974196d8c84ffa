use chrono::Datelike;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style, Table, Tabled};
use tracing_subscriber::EnvFilter;

use grn::config::{
    config_dir, load_config, load_master, load_rows_json, load_state, ColumnDef,
    CONFIG_TEMPLATE, DEFAULT_LOG_FILTER, MASTER_TEMPLATE,
};
use grn::error::{GrnError, Result};
use grn::filter::{filter_rows, FilterSet, Row, Scalar};
use grn::grn::{
    add_item, create_grn, format_amount, format_grn_number, remove_item, resolve_grn_number,
    set_charge, set_item_field, ChargeField, LineField,
};
use grn::GrnRecord;

#[derive(Parser)]
#[command(name = "grn")]
#[command(
    version,
    about = "Pharmacy goods received notes and master table filtering",
    long_about = None
)]
struct Cli {
    /// Path to config directory (default: XDG config dir or ~/.grn)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with template files
    Init,

    /// Show the pharmacy master table, optionally filtered
    Master {
        /// Filter clause "field:PREFIX:value" (can be repeated; all must hold)
        #[arg(short = 'w', long = "where", value_name = "FIELD:PREFIX:VALUE")]
        filters: Vec<String>,

        /// Print matching rows as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Filter rows from a JSON file (an array of objects)
    Filter {
        /// JSON file with the rows
        #[arg(short, long)]
        input: PathBuf,

        /// Filter clause "field:PREFIX:value" (can be repeated; all must hold)
        #[arg(short = 'w', long = "where", value_name = "FIELD:PREFIX:VALUE")]
        filters: Vec<String>,

        /// Print matching rows as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Open a new goods received note
    New {
        /// Supplier name
        #[arg(short, long)]
        supplier: String,

        /// Supplier's invoice number
        #[arg(long)]
        invoice_no: Option<String>,

        /// Receipt date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List GRNs
    List {
        /// Number of GRNs to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show a GRN with its line items and totals
    Show {
        /// GRN number or index from 'list' (e.g., 1 or GRN-2026-0001)
        grn: String,
    },

    /// Add a line item to a GRN
    AddItem {
        /// GRN number or index from 'list'
        grn: String,

        /// Product name
        #[arg(short, long, default_value = "")]
        product: String,

        /// Initial values in format "field=value" (can be repeated, applied in order)
        #[arg(short, long = "set", value_name = "FIELD=VALUE", allow_hyphen_values = true)]
        set: Vec<String>,
    },

    /// Remove a line item from a GRN
    RemoveItem {
        /// GRN number or index from 'list'
        grn: String,

        /// 1-based line number
        line: usize,
    },

    /// Edit one field of a line item
    Set {
        /// GRN number or index from 'list'
        grn: String,

        /// 1-based line number
        line: usize,

        /// Field name (pack, quantity, free_quantity, mrp, rate, tax_percentage,
        /// discount_percentage, or any other detail such as batch)
        field: String,

        /// New value, as typed
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Edit a payment field (discount percentage, credit note, or a charge)
    Charge {
        /// GRN number or index from 'list'
        grn: String,

        /// over_all_discount_percentage, credit_note_amount, other_charges,
        /// freight, cst, excise or cess
        field: String,

        /// New value, as typed
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Show ledger status and next GRN number
    Status,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    init_logging(&cfg_dir);

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Master { filters, json } => cmd_master(&cfg_dir, &filters, json),
        Commands::Filter {
            input,
            filters,
            json,
        } => cmd_filter(&input, &filters, json),
        Commands::New {
            supplier,
            invoice_no,
            date,
        } => cmd_new(&cfg_dir, &supplier, invoice_no, date),
        Commands::List { limit } => cmd_list(&cfg_dir, limit),
        Commands::Show { grn } => cmd_show(&cfg_dir, &grn),
        Commands::AddItem { grn, product, set } => cmd_add_item(&cfg_dir, &grn, &product, &set),
        Commands::RemoveItem { grn, line } => cmd_remove_item(&cfg_dir, &grn, line),
        Commands::Set {
            grn,
            line,
            field,
            value,
        } => cmd_set(&cfg_dir, &grn, line, &field, &value),
        Commands::Charge { grn, field, value } => cmd_charge(&cfg_dir, &grn, &field, &value),
        Commands::Status => cmd_status(&cfg_dir),
    }
}

/// GRN_LOG wins over `[logging] filter`; a missing or broken config falls
/// back to the default filter.
fn init_logging(cfg_dir: &Path) {
    let fallback = load_config(cfg_dir)
        .map(|c| c.logging.filter)
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
    let filter = EnvFilter::try_from_env("GRN_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn ensure_initialized(cfg_dir: &Path) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(GrnError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    Ok(())
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(GrnError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(cfg_dir.join("master.toml"), MASTER_TEMPLATE)?;

    println!("Initialized grn config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your pharmacy details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!(
        "  2. Fill in the master table:    $EDITOR {}/master.toml",
        cfg_dir.display()
    );
    println!();
    println!("Then record your first delivery:");
    println!("  grn new --supplier <name>");

    Ok(())
}

/// Columns in order of first appearance across the rows
fn columns_from_rows(rows: &[Row]) -> Vec<ColumnDef> {
    let mut columns: Vec<ColumnDef> = Vec::new();
    for row in rows {
        for field in row.keys() {
            if !columns.iter().any(|c| &c.field == field) {
                columns.push(ColumnDef {
                    field: field.clone(),
                    header_name: field.to_uppercase(),
                });
            }
        }
    }
    columns
}

fn render_rows(rows: &[&Row], columns: &[ColumnDef]) -> String {
    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.header_name.clone()));
    for row in rows {
        builder.push_record(
            columns
                .iter()
                .map(|c| row.get(&c.field).map(Scalar::display).unwrap_or_default()),
        );
    }
    builder.build().with(Style::rounded()).to_string()
}

fn print_filtered(
    rows: &[Row],
    clauses: &[String],
    columns: &[ColumnDef],
    json: bool,
) -> Result<()> {
    let filter_set = FilterSet::from_clauses(clauses)?;
    let kept = filter_rows(rows, &filter_set);

    if json {
        let out = serde_json::to_string_pretty(&kept).map_err(|e| GrnError::Io(e.into()))?;
        println!("{out}");
        return Ok(());
    }

    if kept.is_empty() {
        println!("No rows match the given filters.");
    } else {
        println!("{}", render_rows(&kept, columns));
    }
    println!("Showing {} of {} rows", kept.len(), rows.len());
    for (field, condition) in filter_set.active() {
        println!("  {field} {condition}");
    }

    Ok(())
}

/// Show the master table
fn cmd_master(cfg_dir: &Path, clauses: &[String], json: bool) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let rows = load_master(cfg_dir)?;

    let columns = if config.master.columns.is_empty() {
        columns_from_rows(&rows)
    } else {
        config.master.columns
    };

    print_filtered(&rows, clauses, &columns, json)
}

/// Filter rows from a JSON file
fn cmd_filter(input: &Path, clauses: &[String], json: bool) -> Result<()> {
    let rows = load_rows_json(input)?;
    let columns = columns_from_rows(&rows);
    print_filtered(&rows, clauses, &columns, json)
}

fn parse_date(s: &str) -> Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| GrnError::InvalidDate(s.to_string()))
}

/// Open a new GRN
fn cmd_new(
    cfg_dir: &Path,
    supplier: &str,
    invoice_no: Option<String>,
    date: Option<String>,
) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let date = date.as_deref().map(parse_date).transpose()?;
    let record = create_grn(cfg_dir, supplier, invoice_no, date)?;

    println!("Created {}", record.number);
    println!("  Supplier: {}", record.supplier);
    println!("  Date:     {}", record.date);
    println!(
        "Add items with: grn add-item {} --product <name> --set quantity=<n> --set rate=<price>",
        record.number
    );

    Ok(())
}

#[derive(Tabled)]
struct GrnRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "SUPPLIER")]
    supplier: String,
    #[tabled(rename = "ITEMS")]
    items: usize,
    #[tabled(rename = "NET PAYABLE")]
    net_payable: String,
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "#")]
    line: usize,
    #[tabled(rename = "PRODUCT")]
    product: String,
    #[tabled(rename = "PACK")]
    pack: String,
    #[tabled(rename = "QTY")]
    quantity: String,
    #[tabled(rename = "FREE")]
    free: String,
    #[tabled(rename = "MRP")]
    mrp: String,
    #[tabled(rename = "RATE")]
    rate: String,
    #[tabled(rename = "TAX %")]
    tax_pct: String,
    #[tabled(rename = "DISC %")]
    disc_pct: String,
    #[tabled(rename = "MRP/TAB")]
    mrp_per_tablet: String,
    #[tabled(rename = "RATE/TAB")]
    rate_per_tablet: String,
    #[tabled(rename = "TAX")]
    tax: String,
    #[tabled(rename = "DISC")]
    discount: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

/// Inputs print the way they were typed: no forced decimals
fn plain(value: f64) -> String {
    Scalar::Number(value).to_js_string()
}

/// List GRNs, newest first
fn cmd_list(cfg_dir: &Path, limit: Option<usize>) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    if state.grns.is_empty() {
        println!("No GRNs recorded yet.");
        return Ok(());
    }

    let shown = limit.unwrap_or(state.grns.len());
    let rows: Vec<GrnRow> = state
        .grns
        .iter()
        .rev()
        .take(shown)
        .enumerate()
        .map(|(idx, g)| GrnRow {
            index: idx + 1,
            number: g.number.clone(),
            date: g.date.to_string(),
            supplier: g.supplier.clone(),
            items: g.items.len(),
            net_payable: format!(
                "{}{}",
                config.grn.currency_symbol,
                format_amount(g.payment.net_payable)
            ),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("Total: {} GRNs", state.grns.len());
    println!("Use index number with show/add-item/set/charge (e.g., 'grn show 1')");

    Ok(())
}

fn print_grn(record: &GrnRecord, currency: &str) {
    print!("{}  {}  {}", record.number, record.date, record.supplier);
    if let Some(invoice_no) = &record.invoice_no {
        print!("  (invoice {invoice_no})");
    }
    println!();

    if record.items.is_empty() {
        println!("  No items.");
    } else {
        let rows: Vec<ItemRow> = record
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| ItemRow {
                line: idx + 1,
                product: item.product().to_string(),
                pack: plain(item.pack),
                quantity: plain(item.quantity),
                free: plain(item.free_quantity),
                mrp: plain(item.mrp),
                rate: plain(item.rate),
                tax_pct: plain(item.tax_percentage),
                disc_pct: plain(item.discount_percentage),
                mrp_per_tablet: format_amount(item.mrp_per_tablet),
                rate_per_tablet: format_amount(item.rate_per_tablet),
                tax: format_amount(item.tax_amount),
                discount: format_amount(item.discount_amount),
                amount: format_amount(item.amount),
            })
            .collect();
        println!("{}", Table::new(rows).with(Style::rounded()));
    }

    let p = &record.payment;
    let money = |v: f64| format!("{currency}{}", format_amount(v));
    println!("Sub total:      {}", money(p.sub_total));
    println!(
        "Discount ({}%): {}",
        plain(p.over_all_discount_percentage),
        money(p.over_all_discount_amount)
    );
    println!("Net amount:     {}", money(p.net_amount));
    println!("Charges:        {}", money(p.charges_total()));
    println!("Credit note:    {}", money(p.credit_note_amount));
    println!("Net payable:    {}", money(p.net_payable));
}

/// Show one GRN
fn cmd_show(cfg_dir: &Path, reference: &str) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;
    let number = resolve_grn_number(&state, reference)?;
    let record = state
        .grns
        .iter()
        .find(|g| g.number == number)
        .ok_or_else(|| GrnError::GrnNotFound(number.clone()))?;

    print_grn(record, &config.grn.currency_symbol);
    Ok(())
}

fn parse_edit(input: &str) -> Result<(LineField, String)> {
    let (field, value) = input
        .split_once('=')
        .ok_or_else(|| GrnError::InvalidEdit(input.to_string()))?;
    if field.trim().is_empty() {
        return Err(GrnError::InvalidEdit(input.to_string()));
    }
    Ok((field.parse()?, value.to_string()))
}

/// Add a line item
fn cmd_add_item(cfg_dir: &Path, reference: &str, product: &str, set: &[String]) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let edits = set
        .iter()
        .map(|s| parse_edit(s))
        .collect::<Result<Vec<_>>>()?;
    let config = load_config(cfg_dir)?;
    let (record, line) = add_item(cfg_dir, reference, product, &edits)?;

    println!("Added line {} to {}", line, record.number);
    print_grn(&record, &config.grn.currency_symbol);
    Ok(())
}

/// Remove a line item
fn cmd_remove_item(cfg_dir: &Path, reference: &str, line: usize) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let (record, removed) = remove_item(cfg_dir, reference, line)?;

    let product = match removed.product() {
        "" => "item".to_string(),
        name => format!("'{name}'"),
    };
    println!("Removed {} (line {}) from {}", product, line, record.number);
    print_grn(&record, &config.grn.currency_symbol);
    Ok(())
}

/// Edit one line item field
fn cmd_set(cfg_dir: &Path, reference: &str, line: usize, field: &str, value: &str) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let field: LineField = field.parse()?;
    let config = load_config(cfg_dir)?;
    let record = set_item_field(cfg_dir, reference, line, &field, value)?;

    println!("Updated {} line {}: {} = {}", record.number, line, field, value);
    print_grn(&record, &config.grn.currency_symbol);
    Ok(())
}

/// Edit one payment field
fn cmd_charge(cfg_dir: &Path, reference: &str, field: &str, value: &str) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let field: ChargeField = field.parse()?;
    let config = load_config(cfg_dir)?;
    let record = set_charge(cfg_dir, reference, field, value)?;

    println!("Updated {}: {} = {}", record.number, field, value);
    print_grn(&record, &config.grn.currency_symbol);
    Ok(())
}

/// Show ledger status
fn cmd_status(cfg_dir: &Path) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let master = load_master(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    let current_year = chrono::Local::now().year() as u32;
    let next_seq = if state.counter.last_year == current_year {
        state.counter.last_number + 1
    } else {
        1 // Reset for new year
    };
    let next_number = format_grn_number(&config.grn.number_format, current_year, next_seq);

    println!("GRN Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Pharmacy:         {}", config.pharmacy.name);
    println!("Master rows:      {}", master.len());
    println!("GRNs:             {}", state.grns.len());
    println!("Next GRN:         {}", next_number);

    if !state.grns.is_empty() {
        println!();
        println!("Recent GRNs:");
        for g in state.grns.iter().rev().take(5) {
            println!(
                "  {} - {} - {}{}",
                g.number,
                g.supplier,
                config.grn.currency_symbol,
                format_amount(g.payment.net_payable)
            );
        }
    }

    Ok(())
}
