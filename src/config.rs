//! Run Configuration
//!
//! Parameter-file model, time-window conversion, and the fixed Resource Graph
//! API settings.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;
use url::Url;

/// OAuth2 scope for the Azure management plane
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

/// Run parameters, loaded from a JSON parameter file.
/// Field names match the wire format of the parameter file.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    #[serde(rename = "tenantname")]
    pub tenant_name: String,
    pub client_id: String,
    pub client_secret: String,
    pub resource_type: String,
    pub subscription: String,
    /// Inclusive window start, `YYYY-MM-DD`
    pub start_time: String,
    /// Inclusive window end, `YYYY-MM-DD`
    pub end_time: String,
    #[serde(rename = "exportfilename")]
    pub export_filename: String,
}

impl RunConfig {
    /// Load run parameters from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read parameter file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse parameter file {}", path.display()))
    }

    /// Build the query time window from the configured dates
    pub fn time_window(&self) -> Result<TimeWindow> {
        TimeWindow::from_dates(&self.start_time, &self.end_time)
    }
}

/// Query interval in the wire timestamp format (`YYYY-MM-DDTHH:MM:SS`, no offset)
#[derive(Debug, Clone)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

impl TimeWindow {
    /// Convert a pair of `YYYY-MM-DD` dates to the wire format
    pub fn from_dates(start: &str, end: &str) -> Result<Self> {
        Ok(Self {
            start: to_wire_timestamp(start)?,
            end: to_wire_timestamp(end)?,
        })
    }
}

fn to_wire_timestamp(date: &str) -> Result<String> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", date))?;
    Ok(parsed
        .and_hms_opt(0, 0, 0)
        .context("Invalid time of day")?
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string())
}

/// Fixed Resource Graph endpoints and API versions.
///
/// Constructed once at startup and passed explicitly to every component.
/// `with_base` points all endpoints at an alternate host for tests.
#[derive(Debug, Clone)]
pub struct ArgApi {
    pub resources: Url,
    pub resources_api_version: String,
    pub changes: Url,
    pub change_details: Url,
    pub changes_api_version: String,
}

const RESOURCE_GRAPH_PROVIDER: &str = "providers/Microsoft.ResourceGraph";

impl ArgApi {
    /// Endpoints under an arbitrary base URL
    pub fn with_base(base: &Url) -> Result<Self> {
        let join = |path: &str| {
            base.join(&format!("{}/{}", RESOURCE_GRAPH_PROVIDER, path))
                .with_context(|| format!("Invalid endpoint path {}", path))
        };
        Ok(Self {
            resources: join("resources")?,
            resources_api_version: "2019-04-01".to_string(),
            changes: join("resourceChanges")?,
            change_details: join("resourceChangeDetails")?,
            changes_api_version: "2018-09-01-preview".to_string(),
        })
    }
}

impl Default for ArgApi {
    fn default() -> Self {
        let base = Url::parse("https://management.azure.com/")
            .expect("management endpoint URL is valid");
        Self::with_base(&base).expect("default endpoints are valid")
    }
}
