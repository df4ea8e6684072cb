#![warn(missing_debug_implementations, unreachable_pub)]

//! A Rust library for collecting clan, river race and donation data from the
//! Clash Royale API and persisting it as JSON snapshots.

extern crate chrono;
extern crate envconfig;
#[macro_use]
extern crate log;
extern crate once_cell;
extern crate regex;
pub extern crate reqwest;
#[macro_use]
extern crate serde;
extern crate serde_json;
extern crate tempfile;
#[macro_use]
extern crate thiserror;
extern crate tokio;

mod format;
pub mod clan_data;
pub mod client;
pub mod collect;
pub mod donations;
pub mod options;
pub mod store;

pub use crate::clan_data::{ClanSnapshot, Member, WarData};
pub use crate::client::{ApiClient, ApiResponse, HttpClient};
pub use crate::collect::RunReport;
pub use crate::donations::DonationHistory;
pub use crate::options::{ClanTag, Options};

pub type Map<K, V> = std::collections::BTreeMap<K, V>;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  ReqwestError(#[from] reqwest::Error),
  #[error(transparent)]
  JsonError(#[from] serde_json::Error),
  #[error(transparent)]
  IoError(#[from] std::io::Error),
  #[error(transparent)]
  ConfigError(#[from] envconfig::Error),
  #[error(transparent)]
  TaskError(#[from] tokio::task::JoinError),
  #[error(transparent)]
  InvalidClanTag(#[from] crate::options::ParseClanTagError),
  /// Returned at startup when `CLASH_API_KEY` is unset or empty.
  #[error("CLASH_API_KEY environment variable is not set")]
  MissingApiKey,
  #[error("request for {endpoint} failed with status {status}{}", reason_suffix(.reason))]
  UnsuccessfulStatus {
    endpoint: &'static str,
    status: u16,
    reason: Option<String>
  }
}

pub(crate) fn reason_suffix(reason: &Option<String>) -> String {
  reason.as_deref().map_or_else(String::new, |reason| format!(" ({reason})"))
}
