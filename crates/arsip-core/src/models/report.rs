use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Company;

/// A financial report row, either a plan (RKAP) or a realization for a
/// company/year/period. Ratio computation happens server-side; the client
/// only carries the values through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialReport {
    pub id: String,
    pub company_id: String,
    pub year: String,
    pub period: String,
    pub is_rkap: bool,

    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub operating_profit: f64,
    #[serde(default)]
    pub net_profit: f64,
    #[serde(default)]
    pub equity: f64,

    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub company: Option<Company>,
}

/// Payload for creating or updating a financial report.
#[derive(Debug, Clone, Serialize)]
pub struct SaveFinancialReport<'a> {
    pub company_id: &'a str,
    pub year: &'a str,
    pub period: &'a str,
    pub is_rkap: bool,
    pub revenue: f64,
    pub operating_profit: f64,
    pub net_profit: f64,
    pub equity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<&'a str>,
}

/// Response from `GET /financial-reports/compare`: the RKAP plan next to the
/// realization for the same company/year/period.
#[derive(Debug, Clone, Deserialize)]
pub struct FinancialReportComparison {
    #[serde(default)]
    pub rkap: Option<FinancialReport>,
    #[serde(default)]
    pub realisasi: Option<FinancialReport>,
}
