use std::path::PathBuf;
use std::time::Duration;

use rocket::figment::providers::{Env, Format, Toml};
use rocket::figment::Figment;

use crate::common::MediaServer;



// Keys read from the same figment Rocket uses, so they can live in Rocket.toml,
// any file passed with --config, or ROCKET_* environment variables.
#[derive(Clone)]
#[derive(Debug)]
#[derive(Serialize, Deserialize)]
pub struct Config {
	#[serde(default = "default_engine_url")]
	pub engine_url: String,
	#[serde(default = "default_engine_timeout_secs")]
	pub engine_timeout_secs: u64,
	#[serde(default = "default_channels_file")]
	pub channels_file: PathBuf,
	#[serde(default = "default_media_server")]
	pub default_media_server: String,
	#[serde(default)]
	pub media_servers: Vec<MediaServer>,
}

fn default_engine_url() -> String {
	"http://127.0.0.1:15060/".to_string()
}

fn default_engine_timeout_secs() -> u64 {
	10
}

fn default_channels_file() -> PathBuf {
	PathBuf::from("/etc/clustervms/channels.yaml")
}

fn default_media_server() -> String {
	"local".to_string()
}

impl Config {
	pub fn engine_deadline(&self) -> Duration {
		Duration::from_secs(self.engine_timeout_secs.max(1))
	}
}

/// Rocket's default figment with each extra TOML file merged over it, in order.
/// Environment variables keep the last word.
pub fn figment<'a>(files: impl IntoIterator<Item = &'a str>) -> Figment {
	let mut figment = rocket::Config::figment();
	for file in files {
		figment = figment.merge(Toml::file(file).nested());
	}
	figment.merge(Env::prefixed("ROCKET_").ignore(&["PROFILE"]).global())
}
