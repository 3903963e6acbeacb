//! Time & Pay Ledger Engine
//!
//! This crate records employee attendance against global and special
//! schedules, classifies overtime with holiday, Sunday and night
//! multipliers, and keeps an approval-gated hour bank and vacation balance
//! per employee.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
pub mod workflow;
