#![cfg(test)]

use chrono::{Duration, TimeZone, Utc};
use clan_tracker::collect;
use clan_tracker::options::ApiKey;
use clan_tracker::{ApiClient, ApiResponse, ClanSnapshot, DonationHistory, Error, Options, WarData};
use serde_json::Value;

use std::cell::RefCell;
use std::collections::HashMap;

macro_rules! sample {
  ($file:expr) => (serde_json::from_slice::<Value>(include_bytes!($file)).unwrap());
}

const CLAN: &str = "/clans/%23YQY9R8PP";
const MEMBERS: &str = "/clans/%23YQY9R8PP/members";
const CURRENT_RACE: &str = "/clans/%23YQY9R8PP/currentriverrace";
const RACE_LOG: &str = "/clans/%23YQY9R8PP/riverracelog?limit=5";

/// Serves canned responses by path and records every request.
#[derive(Debug, Default)]
struct FakeClient {
  responses: HashMap<&'static str, ApiResponse>,
  requests: RefCell<Vec<String>>
}

impl FakeClient {
  fn with_samples() -> Self {
    FakeClient::default()
      .respond(CLAN, 200, sample!("samples/clan.json"))
      .respond(MEMBERS, 200, sample!("samples/members.json"))
      .respond(CURRENT_RACE, 200, sample!("samples/currentriverrace.json"))
      .respond(RACE_LOG, 200, sample!("samples/riverracelog.json"))
  }

  fn respond(mut self, path: &'static str, status: u16, body: Value) -> Self {
    self.responses.insert(path, ApiResponse::new(status, body));
    self
  }
}

impl ApiClient for FakeClient {
  async fn get(&self, path: &str) -> Result<ApiResponse, Error> {
    self.requests.borrow_mut().push(path.to_owned());
    Ok(self.responses.get(path).cloned().unwrap_or_else(|| {
      ApiResponse::new(404, serde_json::json!({ "reason": "notFound" }))
    }))
  }
}

fn options(dir: &tempfile::TempDir) -> Options {
  let api_key = ApiKey::new("secret").unwrap();
  Options::new(api_key, "#YQY9R8PP".parse().unwrap()).output_dir(dir.path())
}

fn read<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> T {
  serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[tokio::test]
async fn full_run_writes_all_files() {
  let dir = tempfile::tempdir().unwrap();
  let options = options(&dir);
  let client = FakeClient::with_samples();
  let now = Utc.with_ymd_and_hms(2024, 1, 10, 18, 0, 0).unwrap();

  let report = collect::run(&client, &options, now).await.unwrap();
  assert_eq!(report.members, 3);
  assert!(report.current_war);
  assert_eq!(report.previous_wars, 3);
  assert_eq!(report.wars_without_clan, 1);
  assert!(report.snapshot_taken);
  assert_eq!(*client.requests.borrow(), vec![CLAN, MEMBERS, CURRENT_RACE, RACE_LOG]);

  let clan: Value = read(&options.clan_output);
  assert_eq!(clan["name"], "Royal Rumble");
  assert_eq!(clan["location"]["countryCode"], "DE");
  assert_eq!(clan["memberList"].as_array().unwrap().len(), 3);
  assert_eq!(clan["memberList"][1]["name"], "Bob");
  assert_eq!(clan["memberList"][1]["donationsReceived"], 40);
  assert_eq!(clan["memberList"][1]["trophies"], 6890);

  let clan: ClanSnapshot = read(&options.clan_output);
  assert_eq!(clan.find_member("Carol").map(|member| member.donations), Some(0));

  // river race timestamps keep the upstream form
  let raw_wars: Value = read(&options.war_output);
  assert_eq!(raw_wars["currentWar"]["startTime"], "20240111T094000.000Z");
  assert_eq!(raw_wars["currentWar"]["endTime"], "20240115T094000.000Z");
  assert_eq!(raw_wars["previousWars"][0]["date"], "20240108T095013.000Z");
  assert_eq!(raw_wars["previousWars"][2]["date"], "20231225T100002.000Z");

  let wars: WarData = read(&options.war_output);
  let current = wars.current_war.unwrap();
  assert_eq!(current.participants.len(), 2);
  assert_eq!(current.start_time, Some(Utc.with_ymd_and_hms(2024, 1, 11, 9, 40, 0).unwrap()));
  assert_eq!(current.end_time, Some(Utc.with_ymd_and_hms(2024, 1, 15, 9, 40, 0).unwrap()));

  // tracked clan is second in the standings of the newest war
  let newest = &wars.previous_wars[0];
  assert_eq!(newest.date, Utc.with_ymd_and_hms(2024, 1, 8, 9, 50, 13).unwrap());
  let points: Vec<(&str, u32)> = newest.participants.iter()
    .map(|participant| (participant.name.as_str(), participant.points))
    .collect();
  assert_eq!(points, vec![("Alice", 3200), ("Bob", 2950), ("Carol", 0)]);

  // clan missing from the standings of the second war
  assert_eq!(wars.previous_wars[1].date, Utc.with_ymd_and_hms(2024, 1, 1, 9, 55, 11).unwrap());
  assert!(wars.previous_wars[1].participants.is_empty());
  assert_eq!(wars.previous_wars[2].participants.len(), 1);

  let history: DonationHistory = read(&options.donation_output);
  assert_eq!(history.tracking_start_date, now);
  assert_eq!(history.weekly_snapshots.len(), 1);
  assert_eq!(history.all_time_total("Alice"), 120);
  assert_eq!(history.all_time_total("Bob"), 64);
  assert_eq!(history.all_time_total("Carol"), 0);
}

#[tokio::test]
async fn repeated_runs_only_snapshot_weekly() {
  let dir = tempfile::tempdir().unwrap();
  let options = options(&dir);
  let client = FakeClient::with_samples();
  let now = Utc.with_ymd_and_hms(2024, 1, 10, 18, 0, 0).unwrap();

  assert!(collect::run(&client, &options, now).await.unwrap().snapshot_taken);
  assert!(!collect::run(&client, &options, now + Duration::days(2)).await.unwrap().snapshot_taken);
  assert!(collect::run(&client, &options, now + Duration::days(6)).await.unwrap().snapshot_taken);

  let history: DonationHistory = read(&options.donation_output);
  assert_eq!(history.weekly_snapshots.len(), 2);
  assert_eq!(history.all_time_total("Alice"), 240);
  assert_eq!(history.tracking_start_date, now);
}

#[tokio::test]
async fn primary_failure_writes_nothing() {
  let dir = tempfile::tempdir().unwrap();
  let options = options(&dir);
  let client = FakeClient::with_samples()
    .respond(MEMBERS, 403, serde_json::json!({ "reason": "accessDenied", "message": "Invalid authorization" }));

  let err = collect::run(&client, &options, Utc::now()).await.unwrap_err();
  match err {
    Error::UnsuccessfulStatus { endpoint, status, reason } => {
      assert_eq!(endpoint, "members");
      assert_eq!(status, 403);
      assert_eq!(reason.as_deref(), Some("accessDenied"));
    },
    other => panic!("unexpected error: {other}")
  };

  assert!(!options.clan_output.exists());
  assert!(!options.war_output.exists());
  assert!(!options.donation_output.exists());
}

#[tokio::test]
async fn secondary_failures_degrade_to_empty_war_data() {
  let dir = tempfile::tempdir().unwrap();
  let options = options(&dir);
  let client = FakeClient::with_samples()
    .respond(CURRENT_RACE, 503, Value::Null)
    .respond(RACE_LOG, 200, serde_json::json!({ "items": "not a list" }));

  let report = collect::run(&client, &options, Utc::now()).await.unwrap();
  assert!(!report.current_war);
  assert_eq!(report.previous_wars, 0);

  let wars: Value = read(&options.war_output);
  assert_eq!(wars, serde_json::json!({ "currentWar": null, "previousWars": [] }));
  assert!(options.donation_output.exists());
}

#[tokio::test]
async fn war_log_limit_is_applied() {
  let dir = tempfile::tempdir().unwrap();
  let options = options(&dir).war_log_limit(2);
  let client = FakeClient::with_samples()
    .respond("/clans/%23YQY9R8PP/riverracelog?limit=2", 200, sample!("samples/riverracelog.json"));

  let (wars, unmatched) = collect::fetch_war_data(&client, &options).await.unwrap();
  assert_eq!(wars.previous_wars.len(), 2);
  assert_eq!(unmatched, 1);
}

#[tokio::test]
async fn corrupt_history_is_not_overwritten() {
  let dir = tempfile::tempdir().unwrap();
  let options = options(&dir);
  std::fs::write(&options.donation_output, b"{ not json").unwrap();
  let client = FakeClient::with_samples();

  let err = collect::run(&client, &options, Utc::now()).await.unwrap_err();
  assert!(matches!(err, Error::JsonError(_)));
  assert_eq!(std::fs::read(&options.donation_output).unwrap(), b"{ not json");
}

#[tokio::test]
async fn output_uses_four_space_indent() {
  let dir = tempfile::tempdir().unwrap();
  let options = options(&dir);
  let client = FakeClient::with_samples();

  collect::run(&client, &options, Utc::now()).await.unwrap();
  let text = std::fs::read_to_string(&options.war_output).unwrap();
  assert!(text.starts_with("{\n    \"currentWar\": {\n        \""));
  assert!(text.ends_with("}\n"));
}
