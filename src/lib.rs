//! # godaddy-ddns
//!
//! A DDNS-like updater for domains hosted at GoDaddy.
//!
//! Each invocation performs one reconciliation pass: discover the public
//! IPv4 address, compare it with the cached one and, if it changed, point
//! the configured domains and aliases at it. Scheduling is left to cron or
//! a systemd timer.
//!
//! ## Usage
//!
//! ```bash
//! # Update if the IP changed since the last run
//! godaddy-ddns --config /etc/godaddy-ddns/config.yaml
//!
//! # Update regardless of the cached IP
//! godaddy-ddns update --force
//!
//! # Check credentials and target domains
//! godaddy-ddns validate
//! ```
//!
//! Only one instance should run against a given cache file at a time.

pub mod cache;
pub mod config;
pub mod detector;
pub mod error;
pub mod journal;
pub mod providers;
pub mod updater;

pub use config::Config;
pub use detector::{IpDetector, IpResolver};
pub use error::{DdnsError, ErrorKind, Result};
pub use updater::{Outcome, Updater};
