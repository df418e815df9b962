use std::path::Path;

use log::{info, warn, error};

use crate::common::Channel;
use crate::common::ChannelMap;
use crate::common::MediaServer;



#[rocket::async_trait]
pub trait ChannelDirectory: Send + Sync {
	async fn resolve(&self, id: &str) -> Option<Channel>;
}

#[rocket::async_trait]
pub trait MediaRelayRegistry: Send + Sync {
	async fn get_default(&self) -> Option<MediaServer>;
}



/// Channel directory backed by a YAML list of channels.
pub struct FileChannelDirectory {
	channels: ChannelMap,
}

impl FileChannelDirectory {
	pub async fn load(path: &Path) -> Self {
		let channels = read_channels_file(path).await;
		info!("Loaded {} channels from {}", channels.len(), path.display());
		FileChannelDirectory {
			channels,
		}
	}
}

#[rocket::async_trait]
impl ChannelDirectory for FileChannelDirectory {
	async fn resolve(&self, id: &str) -> Option<Channel> {
		self.channels.get(id).cloned()
	}
}

fn parse_channels(yaml: &str) -> Result<ChannelMap, serde_yaml::Error> {
	let list: Vec<Channel> = serde_yaml::from_str(yaml)?;
	Ok(list.into_iter().map(|channel| (channel.id.clone(), channel)).collect())
}

async fn read_channels_file(path: &Path) -> ChannelMap {
	match tokio::fs::read_to_string(path).await {
		Ok(contents) => {
			match parse_channels(&contents) {
				Ok(channels) => channels,
				Err(err) => {
					error!("Failed to parse channels file {}; error was {}", path.display(), err);
					ChannelMap::new()
				}
			}
		},
		Err(err) => {
			// Deployments without local channels never create the file, so not necessarily an error
			warn!("Failed to open channels file {} for reading; error was {}", path.display(), err);
			ChannelMap::new()
		}
	}
}



/// Media relays declared in configuration.
pub struct ConfigRelayRegistry {
	default_id: String,
	servers: Vec<MediaServer>,
}

impl ConfigRelayRegistry {
	pub fn new(default_id: String, servers: Vec<MediaServer>) -> Self {
		ConfigRelayRegistry { default_id, servers }
	}
}

#[rocket::async_trait]
impl MediaRelayRegistry for ConfigRelayRegistry {
	async fn get_default(&self) -> Option<MediaServer> {
		self.servers.iter()
			.find(|server| server.id == self.default_id && server.enabled)
			.cloned()
	}
}
