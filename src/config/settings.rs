use serde::{Deserialize, Serialize};

use crate::grn::CalcOptions;

pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub pharmacy: Pharmacy,
    pub grn: GrnSettings,
    #[serde(default)]
    pub logging: LogSettings,
    #[serde(default)]
    pub master: MasterSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Pharmacy {
    pub name: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub license_no: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GrnSettings {
    pub number_format: String,
    pub currency_symbol: String,
    #[serde(flatten)]
    pub calc: CalcOptions,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LogSettings {
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Column definitions for the master table grid.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct MasterSettings {
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ColumnDef {
    pub field: String,
    pub header_name: String,
}
