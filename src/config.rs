use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "sales-dashboard.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Configuration tree
// ---------------------------------------------------------------------------

/// Top-level dashboard configuration. All fields default to the layout of
/// the stock `supermarket_sales.xlsx` workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Data file opened at startup.
    pub data_path: PathBuf,
    pub source: SourceConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("supermarket_sales.xlsx"),
            source: SourceConfig::default(),
        }
    }
}

/// How to find the transaction table inside a source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Worksheet name (spreadsheets only).
    pub sheet: String,
    /// Rows skipped before the header row (spreadsheets and CSV only).
    pub header_offset: usize,
    pub columns: ColumnMapping,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            sheet: "销售数据".to_string(),
            header_offset: 1,
            columns: ColumnMapping::default(),
        }
    }
}

/// Header names of the columns the dashboard reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub order_id: String,
    pub city: String,
    pub customer_type: String,
    pub gender: String,
    pub product_line: String,
    pub total: String,
    pub rating: String,
    pub time: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            order_id: "订单号".to_string(),
            city: "城市".to_string(),
            customer_type: "顾客类型".to_string(),
            gender: "性别".to_string(),
            product_line: "产品类型".to_string(),
            total: "总价".to_string(),
            rating: "评分".to_string(),
            time: "时间".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Load from a JSON file. Missing keys fall back to their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` if it exists, otherwise use defaults. A file that
    /// exists but cannot be parsed is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            log::info!("Loading config from {}", path.display());
            Self::from_file(path)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}
