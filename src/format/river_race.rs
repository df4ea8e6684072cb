use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::clan_data::{CurrentWar, Participant, War};
use crate::format::*;
use crate::options::ClanTag;

impl Endpoint for CurrentRiverRace {
  const IDENTIFIER: &'static str = "current river race";

  fn path(options: &Options) -> String {
    format!("/clans/{}/currentriverrace", options.clan_tag.escaped())
  }
}

impl Endpoint for RiverRaceLog {
  const IDENTIFIER: &'static str = "river race log";

  fn path(options: &Options) -> String {
    format!("/clans/{}/riverracelog?limit={}", options.clan_tag.escaped(), options.war_log_limit)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CurrentRiverRace {
  #[serde(default)]
  clan: Option<RiverRaceClan>,
  #[serde(rename = "collectionEndTime")]
  #[serde(default, deserialize_with = "api_time::option::deserialize")]
  collection_end_time: Option<DateTime<Utc>>,
  #[serde(rename = "warEndTime")]
  #[serde(default, deserialize_with = "api_time::option::deserialize")]
  war_end_time: Option<DateTime<Utc>>
}

impl CurrentRiverRace {
  /// `None` when the tracked clan has nobody taking part yet.
  pub(crate) fn into_current_war(self) -> Option<CurrentWar> {
    let participants = self.clan
      .map(RiverRaceClan::into_participants)
      .unwrap_or_default();
    if participants.is_empty() { return None };

    Some(CurrentWar {
      start_time: self.collection_end_time,
      end_time: self.war_end_time,
      participants
    })
  }
}

/// Entries are decoded one at a time so a malformed entry only loses itself.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RiverRaceLog {
  #[serde(default, deserialize_with = "deserialize_or_default")]
  items: Vec<Value>
}

impl RiverRaceLog {
  /// Converts at most `limit` log entries into wars, newest first as served.
  /// Also returns how many of them had no standing for `clan_tag`.
  pub(crate) fn into_wars(self, clan_tag: &ClanTag, limit: usize) -> (Vec<War>, usize) {
    let mut unmatched = 0;
    let mut wars = Vec::with_capacity(limit.min(self.items.len()));
    for (index, item) in self.items.into_iter().take(limit).enumerate() {
      let entry = match serde_json::from_value::<RiverRaceLogEntry>(item) {
        Ok(entry) => entry,
        Err(err) => {
          warn!("skipping malformed river race log entry {index}: {err}");
          continue;
        }
      };

      match entry.into_war(clan_tag) {
        Ok(war) => wars.push(war),
        Err(war) => {
          unmatched += 1;
          wars.push(war);
        }
      };
    };

    (wars, unmatched)
  }
}

#[derive(Debug, Clone, Deserialize)]
struct RiverRaceLogEntry {
  #[serde(rename = "seasonId")]
  season_id: Option<u32>,
  #[serde(rename = "sectionIndex")]
  section_index: Option<u32>,
  #[serde(rename = "createdDate")]
  #[serde(deserialize_with = "api_time::deserialize")]
  created_date: DateTime<Utc>,
  #[serde(default, deserialize_with = "deserialize_or_default")]
  standings: Vec<RiverRaceStanding>
}

impl RiverRaceLogEntry {
  fn find_standing(&self, clan_tag: &ClanTag) -> Option<usize> {
    self.standings.iter().position(|standing| clan_tag.matches(&standing.clan.tag))
  }

  /// `Err` carries a war with no participants when the clan is missing from the standings.
  fn into_war(mut self, clan_tag: &ClanTag) -> Result<War, War> {
    match self.find_standing(clan_tag) {
      Some(index) => {
        let standing = self.standings.swap_remove(index);
        Ok(War {
          date: self.created_date,
          participants: standing.clan.into_participants()
        })
      },
      None => {
        warn!(
          "clan {clan_tag} not found in standings of war created {} (season {:?}, section {:?})",
          self.created_date, self.season_id, self.section_index
        );
        Err(War { date: self.created_date, participants: Vec::new() })
      }
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
struct RiverRaceStanding {
  // omitted fields: rank, trophyChange
  clan: RiverRaceClan
}

#[derive(Debug, Clone, Deserialize)]
struct RiverRaceClan {
  #[serde(default)]
  tag: String,
  #[serde(default, deserialize_with = "deserialize_or_default")]
  participants: Vec<Value>
}

impl RiverRaceClan {
  /// Participants that fail to decode are left out with a warning.
  fn into_participants(self) -> Vec<Participant> {
    let tag = self.tag;
    recollect_filter(self.participants, |participant| {
      match serde_json::from_value::<RiverRaceParticipant>(participant) {
        Ok(participant) => Some(participant.into_participant()),
        Err(err) => {
          warn!("skipping malformed participant of clan {tag}: {err}");
          None
        }
      }
    })
  }
}

#[derive(Debug, Clone, Deserialize)]
struct RiverRaceParticipant {
  // omitted fields: tag, repairPoints, boatAttacks, decksUsed, decksUsedToday
  name: String,
  #[serde(default)]
  fame: u32
}

impl RiverRaceParticipant {
  fn into_participant(self) -> Participant {
    Participant { name: self.name, points: self.fame }
  }
}
