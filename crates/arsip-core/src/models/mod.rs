//! Domain models mirroring the backend's JSON wire format.

pub mod document;
pub mod report;
pub mod user;

pub use document::{Company, Document};
pub use report::{FinancialReport, FinancialReportComparison, SaveFinancialReport};
pub use user::{AuthResponse, LoginRequest, RegisterRequest, TwoFactorStatus, UserProfile};
