//! Gridwatch — EU grid frequency monitor.
//!
//! Fetches one frequency reading from the netzfrequenz XML API, evaluates
//! it against configured warning/critical bands, and delivers an ntfy
//! notification when a band is crossed. Runs once per invocation; periodic
//! monitoring belongs to an external scheduler (cron, systemd timer).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Configuration loading and validation.
pub mod config;
/// Alert rendering and delivery orchestration.
pub mod dispatch;
/// ntfy notification client.
pub mod notify;
/// Threshold evaluation policy.
pub mod policy;
/// Frequency API client.
pub mod source;
