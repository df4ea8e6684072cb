use chrono::Utc;
use clan_tracker::{HttpClient, Options};
use env_logger::Env;
use log::{error, info};

use std::process::ExitCode;

fn load_options() -> Result<Options, clan_tracker::Error> {
  dotenv::dotenv()
    .map_err(|err| {
      if !err.not_found() {
        eprintln!(".env file error: {err}");
      };
      err
    })
    .ok();

  Options::from_env()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
  let options = match load_options() {
    Ok(options) => options,
    Err(err) => {
      eprintln!("configuration error: {err}");
      return ExitCode::FAILURE;
    }
  };

  env_logger::Builder::from_env(Env::default().default_filter_or(options.log_level.as_str())).init();
  info!("collecting data for clan {}", options.clan_tag);

  let result = match HttpClient::new(&options) {
    Ok(client) => clan_tracker::collect::run(&client, &options, Utc::now()).await,
    Err(err) => Err(err)
  };

  match result {
    Ok(report) => {
      info!(
        "done: {} members, {} previous wars ({} without clan standings), snapshot taken: {}",
        report.members, report.previous_wars, report.wars_without_clan, report.snapshot_taken
      );
      ExitCode::SUCCESS
    },
    Err(err) => {
      error!("collection failed: {err}");
      ExitCode::FAILURE
    }
  }
}
