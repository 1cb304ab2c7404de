//! # FeedbackHub API Library
//!
//! This library provides the core functionality for the FeedbackHub service:
//! a role-based dashboard-feedback workflow where business users raise
//! threaded issues against dashboards, data science teams triage and resolve
//! them, and admins manage assignment and escalation requests.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod realtime;
pub mod repositories;
pub mod server;
pub mod telemetry;
pub mod workflow;
pub use migration;
