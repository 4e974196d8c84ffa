mod settings;
pub mod state;

pub use settings::{ColumnDef, Config, GrnSettings, LogSettings, Pharmacy, DEFAULT_LOG_FILTER};
pub use state::{GrnRecord, State};

use crate::error::{GrnError, Result};
use crate::filter::Row;
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (XDG config dir, or ~/.grn/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "grn") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = std::env::var_os("HOME").map(PathBuf::from).ok_or_else(|| {
        GrnError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".grn"))
}

fn load_toml<T: for<'de> Deserialize<'de>>(path: PathBuf) -> Result<T> {
    if !path.exists() {
        return Err(GrnError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| GrnError::ConfigParse { path, source: e })
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    load_toml(config_dir.join("config.toml"))
}

#[derive(Debug, Deserialize, Default)]
struct MasterTable {
    #[serde(default)]
    rows: Vec<Row>,
}

/// Load the pharmacy master table rows from master.toml
pub fn load_master(config_dir: &Path) -> Result<Vec<Row>> {
    let table: MasterTable = load_toml(config_dir.join("master.toml"))?;
    Ok(table.rows)
}

/// Load grid rows from a JSON file holding an array of objects
pub fn load_rows_json(path: &Path) -> Result<Vec<Row>> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| GrnError::RowsParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load state.toml (empty state if missing)
pub fn load_state(config_dir: &Path) -> Result<State> {
    let path = config_dir.join("state.toml");
    if !path.exists() {
        return Ok(State::default());
    }
    load_toml(path)
}

/// Save state.toml
pub fn save_state(config_dir: &Path, state: &State) -> Result<()> {
    let path = config_dir.join("state.toml");
    let content = toml::to_string_pretty(state)?;
    fs::write(&path, content)?;
    tracing::info!(path = %path.display(), grns = state.grns.len(), "Saved state");
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[pharmacy]
name = "Your Hospital Pharmacy"
address = "1 Hospital Road"
city = "Springfield"
# phone = "+1-555-123-4567"    # optional
# license_no = "DL-20B-1234"   # optional

[grn]
number_format = "GRN-{year}-{seq:04}"  # e.g., GRN-2026-0001
currency_symbol = "$"
# Price the line discount is taken from when the pack size changes
# ("mrp" or "rate"). Every other edit uses the rate.
pack_discount_base = "mrp"
# Recompute totals when the sub-total falls to zero (e.g., all items removed)
recompute_on_empty = false

[logging]
filter = "warn"   # overridden by the GRN_LOG environment variable

# Columns shown by 'grn master', in order
[[master.columns]]
field = "name"
header_name = "NAME"

[[master.columns]]
field = "category"
header_name = "CATEGORY"

[[master.columns]]
field = "stock"
header_name = "STOCK"

[[master.columns]]
field = "mrp"
header_name = "MRP"

[[master.columns]]
field = "status"
header_name = "STATUS"
"#;

/// Template content for master.toml
pub const MASTER_TEMPLATE: &str = r#"# Pharmacy master table. Each [[rows]] entry is one row; values may be
# strings, numbers or booleans. Filter with:
#   grn master --where name:LIKE:para --where stock:LESS_THAN:50

[[rows]]
name = "Paracetamol 500mg"
category = "Analgesic"
stock = 240
mrp = 12.5
status = "ACTIVE"

[[rows]]
name = "Ibuprofen 400mg"
category = "Analgesic"
stock = 35
mrp = 18.0
status = "ACTIVE"

[[rows]]
name = "Amoxicillin 250mg"
category = "Antibiotic"
stock = 0
mrp = 42.75
status = "OUT_OF_STOCK"

[[rows]]
name = "Cetirizine 10mg"
category = "Antihistamine"
stock = 120
mrp = 8.0
status = "DISCONTINUED"
"#;
