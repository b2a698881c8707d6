//! Roster source: fetches the HR report over authenticated HTTP and adapts
//! its entries into the shape the normalizer validates.

pub mod client;
pub mod report;

pub use client::{RosterClient, RosterError};
pub use report::{ReportAdapter, ReportDocument, ReportEntry};
