//! Structs describing what a collection run writes to disk.
//! The field names match the JSON files, so these types also deserialize
//! snapshots written by earlier runs. River race timestamps keep the upstream
//! `20240108T095013.000Z` form.

use chrono::{DateTime, Utc};
use serde_json::{Map as JsonMap, Value};

use crate::Map;



/// Clan metadata as returned by the API, plus its member list.
/// Written to `clan_data.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClanSnapshot {
  /// Every top-level field of the clan object, kept verbatim.
  #[serde(flatten)]
  pub metadata: JsonMap<String, Value>,
  #[serde(rename = "memberList")]
  pub member_list: Vec<Member>
}

impl ClanSnapshot {
  /// The clan's display name, if the API sent one.
  pub fn name(&self) -> Option<&str> {
    self.metadata.get("name").and_then(Value::as_str)
  }

  /// Current-period donation counts keyed by member name.
  /// Members sharing a name have their counts summed.
  pub fn current_donations(&self) -> Map<String, u32> {
    let mut donations = Map::new();
    for member in self.member_list.iter() {
      *donations.entry(member.name.clone()).or_insert(0) += member.donations;
    };
    donations
  }

  /// Searches for a member, given their in-game name.
  pub fn find_member(&self, member_name: impl AsRef<str>) -> Option<&Member> {
    let member_name = member_name.as_ref();
    self.member_list.iter().find(|member| member.name == member_name)
  }
}

/// A clan member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
  pub tag: String,
  pub name: String,
  /// `member`, `elder`, `coLeader` or `leader`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role: Option<String>,
  /// Cards donated in the current upstream period.
  #[serde(default)]
  pub donations: u32,
  #[serde(rename = "donationsReceived")]
  #[serde(default)]
  pub donations_received: u32,
  /// Remaining upstream fields (trophies, arena, last seen...) kept verbatim.
  #[serde(flatten)]
  pub other: JsonMap<String, Value>
}

/// Written to `war_data.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarData {
  #[serde(rename = "currentWar")]
  pub current_war: Option<CurrentWar>,
  #[serde(rename = "previousWars")]
  pub previous_wars: Vec<War>
}

/// The river race in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWar {
  #[serde(rename = "startTime")]
  #[serde(default, with = "crate::format::api_time::option")]
  pub start_time: Option<DateTime<Utc>>,
  #[serde(rename = "endTime")]
  #[serde(default, with = "crate::format::api_time::option")]
  pub end_time: Option<DateTime<Utc>>,
  pub participants: Vec<Participant>
}

/// A finished river race from the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct War {
  #[serde(with = "crate::format::api_time")]
  pub date: DateTime<Utc>,
  /// Empty when the clan could not be found in the race standings.
  pub participants: Vec<Participant>
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
  pub name: String,
  /// The upstream `fame` value.
  pub points: u32
}
