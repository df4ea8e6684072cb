//! Options that specify which clan to track, where to reach the API and where to
//! write the collected snapshots.
//!
//! [`Options::from_env`] is the usual entrypoint: it reads the environment (after
//! an optional `.env` file has been loaded by the caller) and fails early if the
//! API credential is missing or the clan tag is malformed.

use envconfig::Envconfig;
use once_cell::sync::Lazy;
use regex::Regex;

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;



static TAG_BODY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0289PYLQGRJCUV]{3,14}$").unwrap());

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid clan tag {0:?}, expected a tag like \"#YQY9R8PP\"")]
pub struct ParseClanTagError(String);

/// A clan tag, stored without its leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClanTag(String);

impl ClanTag {
  /// The literal form as shown in game and returned by the API, e.g. `#YQY9R8PP`.
  pub fn literal(&self) -> String {
    format!("#{}", self.0)
  }

  /// The form used inside request paths, e.g. `%23YQY9R8PP`.
  pub fn escaped(&self) -> String {
    format!("%23{}", self.0)
  }

  /// Whether an upstream tag (with or without `#`) refers to this clan.
  pub fn matches(&self, tag: &str) -> bool {
    let tag = tag.strip_prefix('#').unwrap_or(tag);
    tag.eq_ignore_ascii_case(&self.0)
  }
}

impl FromStr for ClanTag {
  type Err = ParseClanTagError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    let body = trimmed.strip_prefix('#')
      .or_else(|| trimmed.strip_prefix("%23"))
      .unwrap_or(trimmed)
      .to_ascii_uppercase();
    if TAG_BODY.is_match(&body) {
      Ok(ClanTag(body))
    } else {
      Err(ParseClanTagError(s.to_owned()))
    }
  }
}

impl fmt::Display for ClanTag {
  #[inline]
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// The bearer token sent with every request. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
  pub fn new(key: impl Into<String>) -> Option<Self> {
    let key = key.into();
    if key.trim().is_empty() { None } else { Some(ApiKey(key)) }
  }

  pub fn expose(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for ApiKey {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("ApiKey(<redacted>)")
  }
}

#[derive(Debug, Clone, Envconfig)]
struct EnvOptions {
  #[envconfig(from = "CLASH_API_KEY")]
  api_key: Option<String>,
  #[envconfig(from = "CLAN_TAG", default = "#YQY9R8PP")]
  clan_tag: String,
  #[envconfig(from = "CLASH_API_URL", default = "https://api.clashroyale.com/v1")]
  base_url: String,
  #[envconfig(from = "CLAN_OUTPUT", default = "clan_data.json")]
  clan_output: PathBuf,
  #[envconfig(from = "WAR_OUTPUT", default = "war_data.json")]
  war_output: PathBuf,
  #[envconfig(from = "DONATION_OUTPUT", default = "donation_history.json")]
  donation_output: PathBuf,
  #[envconfig(from = "WAR_LOG_LIMIT", default = "5")]
  war_log_limit: usize,
  #[envconfig(from = "LOG_LEVEL", default = "info")]
  log_level: log::Level
}

impl EnvOptions {
  fn into_options(self) -> Result<Options, crate::Error> {
    let api_key = self.api_key.and_then(ApiKey::new)
      .ok_or(crate::Error::MissingApiKey)?;
    let clan_tag = self.clan_tag.parse::<ClanTag>()?;

    Ok(Options {
      api_key,
      clan_tag,
      base_url: self.base_url.trim_end_matches('/').to_owned(),
      clan_output: self.clan_output,
      war_output: self.war_output,
      donation_output: self.donation_output,
      war_log_limit: self.war_log_limit,
      log_level: self.log_level
    })
  }
}

/// Everything a collection run needs to know.
#[derive(Debug, Clone)]
pub struct Options {
  /// The credential sent as `Authorization: Bearer <key>`.
  pub api_key: ApiKey,
  /// The clan whose data is collected.
  pub clan_tag: ClanTag,
  /// API root without a trailing slash.
  pub base_url: String,
  pub clan_output: PathBuf,
  pub war_output: PathBuf,
  pub donation_output: PathBuf,
  /// How many entries of the river race log are kept.
  pub war_log_limit: usize,
  /// Default log filter when `RUST_LOG` is unset.
  pub log_level: log::Level
}

impl Options {
  /// Defaults to <https://api.clashroyale.com/v1>
  pub const DEFAULT_BASE_URL: &'static str = "https://api.clashroyale.com/v1";
  pub const DEFAULT_CLAN_OUTPUT: &'static str = "clan_data.json";
  pub const DEFAULT_WAR_OUTPUT: &'static str = "war_data.json";
  pub const DEFAULT_DONATION_OUTPUT: &'static str = "donation_history.json";
  pub const DEFAULT_WAR_LOG_LIMIT: usize = 5;

  pub fn new(api_key: ApiKey, clan_tag: ClanTag) -> Self {
    Options {
      api_key,
      clan_tag,
      base_url: Self::DEFAULT_BASE_URL.to_owned(),
      clan_output: PathBuf::from(Self::DEFAULT_CLAN_OUTPUT),
      war_output: PathBuf::from(Self::DEFAULT_WAR_OUTPUT),
      donation_output: PathBuf::from(Self::DEFAULT_DONATION_OUTPUT),
      war_log_limit: Self::DEFAULT_WAR_LOG_LIMIT,
      log_level: log::Level::Info
    }
  }

  /// Reads options from the process environment.
  pub fn from_env() -> Result<Self, crate::Error> {
    EnvOptions::init_from_env()?.into_options()
  }

  /// Reads options from an explicit set of variables instead of the environment.
  pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, crate::Error> {
    EnvOptions::init_from_hashmap(vars)?.into_options()
  }

  pub fn base_url(self, base_url: impl Into<String>) -> Self {
    let base_url = base_url.into();
    Options { base_url: base_url.trim_end_matches('/').to_owned(), ..self }
  }

  /// Places all three output files inside `dir`, keeping their default names.
  pub fn output_dir(self, dir: impl Into<PathBuf>) -> Self {
    let dir = dir.into();
    Options {
      clan_output: dir.join(Self::DEFAULT_CLAN_OUTPUT),
      war_output: dir.join(Self::DEFAULT_WAR_OUTPUT),
      donation_output: dir.join(Self::DEFAULT_DONATION_OUTPUT),
      ..self
    }
  }

  pub fn war_log_limit(self, war_log_limit: usize) -> Self {
    Options { war_log_limit, ..self }
  }
}
