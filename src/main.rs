#[macro_use] extern crate rocket;
#[macro_use] extern crate serde_derive;

use std::sync::Arc;

use clap::{Command, Arg, ArgAction};
use log::info;
use rocket::{Request, Response};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use url::Url;

mod alarm;
mod command;
mod common;
mod config;
mod directory;
mod engine;
mod error;
mod notify;
mod playback;
mod ptz;
mod rest_api;
#[cfg(test)]
mod testing;

use crate::config::Config;
use crate::directory::{ConfigRelayRegistry, FileChannelDirectory};
use crate::engine::{HttpSignalingEngine, SignalingEngine};
use crate::notify::BroadcastHub;



const SUBSCRIPTION_EVENT_CAPACITY: usize = 256;

// Since the UI is served by another server, we may need to setup CORS to allow the UI to make requests to this server.
pub struct CORS;

#[rocket::async_trait]
impl Fairing for CORS {
	fn info(&self) -> Info {
		Info {
			name: "Add CORS headers to responses",
			kind: Kind::Response
		}
	}

	async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
		response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
		response.set_header(Header::new("Access-Control-Allow-Methods", "POST, GET, OPTIONS"));
		response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
		response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
	}
}

async fn build_components(config: &Config) -> anyhow::Result<rest_api::Components> {
	let deadline = config.engine_deadline();
	let engine_url = Url::parse(&config.engine_url)?;
	info!("Using signaling engine at {}", engine_url);

	let engine: Arc<dyn SignalingEngine> = Arc::new(HttpSignalingEngine::new(engine_url, deadline)?);
	let hub = Arc::new(BroadcastHub::new(SUBSCRIPTION_EVENT_CAPACITY));
	let channels = Arc::new(FileChannelDirectory::load(&config.channels_file).await);
	let relays = Arc::new(ConfigRelayRegistry::new(
		config.default_media_server.clone(),
		config.media_servers.clone(),
	));

	Ok(rest_api::Components {
		alarms: alarm::AlarmRegistry::new(engine.clone(), hub.clone(), deadline),
		playback: playback::PlaybackOrchestrator::new(engine.clone(), channels, relays, deadline),
		ptz: ptz::PtzDispatch::new(engine, deadline),
		hub,
	})
}


#[rocket::main]
async fn main() -> anyhow::Result<()> {
	let matches = Command::new("clustervms-device-ctl")
		.version("0.0.4")
		.author("Alicrow")
		.about("Device control and alarm subscription service for ClusterVMS.")
		.arg(
			Arg::new("config")
				.action(ArgAction::Append)	// Allow argument to be specified multiple times
				.short('c')
				.long("config")
				.help("TOML file with device control config")
		)
		.get_matches();

	let config_filenames: Vec<&str> = matches.get_many::<String>("config")
		.map(|filenames| filenames.map(|v| v.as_str()).collect())
		.unwrap_or_default();
	let figment = config::figment(config_filenames);
	let config: Config = figment.extract()?;

	let components = build_components(&config).await?;

	rocket::custom(figment)
		.attach(rest_api::stage(components))
		.attach(CORS)
		.launch()
		.await?;

	anyhow::Ok(())
}
