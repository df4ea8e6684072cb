use serde_json::{Map, Value};

use crate::clan_data::{ClanSnapshot, Member};
use crate::format::*;

impl Endpoint for ClanInfo {
  const IDENTIFIER: &'static str = "clan";

  fn path(options: &Options) -> String {
    format!("/clans/{}", options.clan_tag.escaped())
  }
}

impl Endpoint for MemberList {
  const IDENTIFIER: &'static str = "members";

  fn path(options: &Options) -> String {
    format!("/clans/{}/members", options.clan_tag.escaped())
  }
}

/// Clan metadata is kept verbatim; only the member list gets a typed shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub(crate) struct ClanInfo {
  fields: Map<String, Value>
}

impl ClanInfo {
  pub(crate) fn into_clan_snapshot(mut self, members: MemberList) -> ClanSnapshot {
    // the clan endpoint embeds its own copy of the member list
    self.fields.remove("memberList");
    ClanSnapshot {
      metadata: self.fields,
      member_list: members.items
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MemberList {
  #[serde(default, deserialize_with = "deserialize_or_default")]
  items: Vec<Member>
}
