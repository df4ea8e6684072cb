//! One collection run: clan snapshot, war data, then donation tracking.
//!
//! Requests are issued one after another. The clan and member endpoints are
//! required and any failure there aborts the run before a file is written.
//! The river race endpoints are optional: a failed or undecodable response is
//! logged and replaced with empty data.

use chrono::{DateTime, Utc};

use crate::clan_data::{ClanSnapshot, WarData};
use crate::client::ApiClient;
use crate::donations::DonationHistory;
use crate::format::{ClanInfo, CurrentRiverRace, Endpoint, MemberList, RiverRaceLog};
use crate::options::Options;
use crate::store;



/// What a run did, for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
  pub members: usize,
  pub current_war: bool,
  pub previous_wars: usize,
  /// Previous wars whose standings did not include the tracked clan.
  pub wars_without_clan: usize,
  pub snapshot_taken: bool
}

/// Performs a full run and writes all three output files.
pub async fn run<C: ApiClient>(client: &C, options: &Options, now: DateTime<Utc>) -> Result<RunReport, crate::Error> {
  let clan_snapshot = fetch_clan_snapshot(client, options).await?;
  let clan_snapshot = store::save_json(&options.clan_output, clan_snapshot).await?;
  info!(
    "saved clan info for {} + {} members to {}",
    clan_snapshot.name().unwrap_or("(unnamed clan)"),
    clan_snapshot.member_list.len(),
    options.clan_output.display()
  );

  let (war_data, wars_without_clan) = fetch_war_data(client, options).await?;
  let war_data = store::save_json(&options.war_output, war_data).await?;
  info!(
    "saved war data ({}, {} previous wars) to {}",
    if war_data.current_war.is_some() { "current war in progress" } else { "no current war" },
    war_data.previous_wars.len(),
    options.war_output.display()
  );

  let snapshot_taken = track_donations(&clan_snapshot, options, now).await?;

  Ok(RunReport {
    members: clan_snapshot.member_list.len(),
    current_war: war_data.current_war.is_some(),
    previous_wars: war_data.previous_wars.len(),
    wars_without_clan,
    snapshot_taken
  })
}

/// Fetches clan metadata and the member list. Both are required.
pub async fn fetch_clan_snapshot<C: ApiClient>(client: &C, options: &Options) -> Result<ClanSnapshot, crate::Error> {
  let clan_info = get_required::<C, ClanInfo>(client, options).await?;
  let members = get_required::<C, MemberList>(client, options).await?;
  Ok(clan_info.into_clan_snapshot(members))
}

/// Fetches the current river race and the river race log, keeping only the
/// tracked clan's participants. Also returns the number of logged wars the
/// clan could not be found in.
pub async fn fetch_war_data<C: ApiClient>(client: &C, options: &Options) -> Result<(WarData, usize), crate::Error> {
  let current_war = get_optional::<C, CurrentRiverRace>(client, options).await?
    .and_then(CurrentRiverRace::into_current_war);

  let (previous_wars, unmatched) = match get_optional::<C, RiverRaceLog>(client, options).await? {
    Some(log) => log.into_wars(&options.clan_tag, options.war_log_limit),
    None => (Vec::new(), 0)
  };

  Ok((WarData { current_war, previous_wars }, unmatched))
}

/// Loads the donation history, records a snapshot if one is due and saves it back.
pub async fn track_donations(clan_snapshot: &ClanSnapshot, options: &Options, now: DateTime<Utc>) -> Result<bool, crate::Error> {
  let history = store::load_json::<DonationHistory>(&options.donation_output).await?;
  if history.is_none() {
    info!("no donation history at {}, starting a new one", options.donation_output.display());
  };

  let (history, taken) = crate::donations::track(history, &clan_snapshot.current_donations(), now);
  let history = store::save_json(&options.donation_output, history).await?;

  if taken {
    info!(
      "recorded weekly donation snapshot ({} of {} kept)",
      history.weekly_snapshots.len(),
      crate::donations::HISTORY_CAPACITY
    );
  } else if let Some(latest) = history.latest_snapshot() {
    info!("skipped donation snapshot, latest one is from {}", latest.date);
  };

  Ok(taken)
}

async fn get_required<C: ApiClient, T: Endpoint>(client: &C, options: &Options) -> Result<T, crate::Error> {
  let response = client.get(&T::path(options)).await?;
  if !response.is_success() {
    return Err(crate::Error::UnsuccessfulStatus {
      endpoint: T::IDENTIFIER,
      status: response.status,
      reason: response.reason()
    });
  };

  Ok(serde_json::from_value(response.body)?)
}

async fn get_optional<C: ApiClient, T: Endpoint>(client: &C, options: &Options) -> Result<Option<T>, crate::Error> {
  let response = match client.get(&T::path(options)).await {
    Ok(response) => response,
    Err(crate::Error::JsonError(err)) => {
      warn!("could not decode {}: {err}", T::IDENTIFIER);
      return Ok(None);
    },
    Err(err) => return Err(err)
  };

  if !response.is_success() {
    warn!(
      "request for {} failed with status {}{}, continuing without it",
      T::IDENTIFIER,
      response.status,
      crate::reason_suffix(&response.reason())
    );
    return Ok(None);
  };

  match serde_json::from_value(response.body) {
    Ok(item) => Ok(Some(item)),
    Err(err) => {
      warn!("could not decode {}: {err}", T::IDENTIFIER);
      Ok(None)
    }
  }
}
