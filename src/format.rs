mod clan;
mod river_race;

pub(crate) use self::clan::{ClanInfo, MemberList};
pub(crate) use self::river_race::{CurrentRiverRace, RiverRaceLog};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::{Deserialize, DeserializeOwned, Deserializer};

use crate::options::Options;



/// A payload served by one API endpoint.
pub(crate) trait Endpoint: DeserializeOwned {
  const IDENTIFIER: &'static str;

  fn path(options: &Options) -> String;
}

/// Upstream timestamps look like `20240108T095013.000Z`.
const API_TIME_FORMAT: &str = "%Y%m%dT%H%M%S%.fZ";
const API_TIME_OUTPUT_FORMAT: &str = "%Y%m%dT%H%M%S%.3fZ";

/// Parses the upstream form, falling back to RFC 3339.
pub(crate) fn parse_api_time(s: &str) -> Option<DateTime<Utc>> {
  NaiveDateTime::parse_from_str(s, API_TIME_FORMAT).ok()
    .map(|naive| naive.and_utc())
    .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc)))
}

/// Serde adapter writing timestamps back in the upstream form.
pub(crate) mod api_time {
  use chrono::{DateTime, Utc};
  use serde::de::{Deserialize, Deserializer, Error as _};
  use serde::ser::Serializer;

  pub(crate) fn serialize<S: Serializer>(date_time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date_time.format(super::API_TIME_OUTPUT_FORMAT))
  }

  pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let s = String::deserialize(deserializer)?;
    super::parse_api_time(&s).ok_or_else(|| D::Error::custom(format!("invalid timestamp {s:?}")))
  }

  pub(crate) mod option {
    use chrono::{DateTime, Utc};
    use serde::de::{Deserialize, Deserializer, Error as _};
    use serde::ser::Serializer;

    pub(crate) fn serialize<S: Serializer>(date_time: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
      match date_time {
        Some(date_time) => super::serialize(date_time, serializer),
        None => serializer.serialize_none()
      }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
      match Option::<String>::deserialize(deserializer)? {
        Some(s) => crate::format::parse_api_time(&s).map(Some)
          .ok_or_else(|| D::Error::custom(format!("invalid timestamp {s:?}"))),
        None => Ok(None)
      }
    }
  }
}

fn deserialize_or_default<'de, D: Deserializer<'de>, T>(deserializer: D) -> Result<T, D::Error>
where T: Default + Deserialize<'de> {
  Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn recollect_filter<T, U, I, C, F>(i: I, f: F) -> C
where I: IntoIterator<Item = T>, C: FromIterator<U>, F: FnMut(T) -> Option<U> {
  i.into_iter().filter_map(f).collect()
}
