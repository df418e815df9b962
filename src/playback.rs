//! Recorded-video playback sessions.
//!
//! The engine is authoritative for which sessions exist; this orchestrator resolves the
//! channel and media relay, derives the stream identity and relays controls.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use log::info;

use crate::command;
use crate::common::{Channel, Records, StreamMode};
use crate::directory::{ChannelDirectory, MediaRelayRegistry};
use crate::engine::{self, PlaybackInput, SignalingEngine};
use crate::error::{ControlError, Result};



pub const PLAYBACK_APP: &str = "rtp";
pub const PLAYBACK_STREAM_MODE: StreamMode = StreamMode::TcpPassive;

#[derive(Clone)]
#[derive(Debug)]
#[derive(PartialEq, Eq)]
#[derive(Serialize)]
pub struct SessionDescriptor {
	pub stream_id: String,
	pub app: String,
	pub stream: String,
}

// Second granularity: two sessions for one channel started within the same second share an id.
pub fn session_id(channel_key: &str, started: DateTime<Local>) -> String {
	format!("playback_{}_{}", channel_key, started.format("%Y%m%d%H%M%S"))
}

pub struct PlaybackOrchestrator {
	engine: Arc<dyn SignalingEngine>,
	channels: Arc<dyn ChannelDirectory>,
	relays: Arc<dyn MediaRelayRegistry>,
	deadline: Duration,
}

impl PlaybackOrchestrator {
	pub fn new(
		engine: Arc<dyn SignalingEngine>,
		channels: Arc<dyn ChannelDirectory>,
		relays: Arc<dyn MediaRelayRegistry>,
		deadline: Duration,
	) -> Self {
		PlaybackOrchestrator { engine, channels, relays, deadline }
	}

	async fn resolve_channel(&self, channel_key: &str) -> Result<Channel> {
		if channel_key.is_empty() {
			return Err(ControlError::required("channel_id"));
		}
		self.channels.resolve(channel_key).await
			.ok_or_else(|| ControlError::NotFound(channel_key.to_string()))
	}

	pub async fn start(&self, channel_key: &str, start_time: i64, end_time: i64) -> Result<SessionDescriptor> {
		let channel = self.resolve_channel(channel_key).await?;
		let media_server = self.relays.get_default().await
			.ok_or_else(|| ControlError::Unavailable("no default media server".to_string()))?;

		let stream_id = session_id(&channel.id, Local::now());

		let input = PlaybackInput {
			channel,
			media_server,
			stream_mode: PLAYBACK_STREAM_MODE,
			start_time,
			end_time,
		};
		engine::bounded(self.deadline, "playback start", self.engine.playback(&input)).await?;

		info!("Started playback {} on {} ({}..{})", stream_id, input.channel.id, start_time, end_time);
		Ok(SessionDescriptor {
			app: PLAYBACK_APP.to_string(),
			stream: stream_id.clone(),
			stream_id,
		})
	}

	pub async fn stop(&self, channel_key: &str) -> Result<()> {
		let channel = self.resolve_channel(channel_key).await?;
		engine::bounded(self.deadline, "playback stop", self.engine.stop_playback(&channel)).await?;
		info!("Stopped playback on {}", channel.id);
		Ok(())
	}

	pub async fn control(&self, device_id: &str, channel_id: &str, action: &str, scale: f64) -> Result<()> {
		command::require_target(device_id, channel_id)?;
		let (control, scale) = command::map_playback_control(action, scale)?;
		engine::bounded(
			self.deadline,
			"playback control",
			self.engine.playback_control(device_id, channel_id, control, scale),
		).await
	}

	pub async fn query_records(&self, device_id: &str, channel_id: &str, start_time: i64, end_time: i64) -> Result<Records> {
		command::require_target(device_id, channel_id)?;
		engine::bounded(
			self.deadline,
			"record info query",
			self.engine.query_record_info(device_id, channel_id, start_time, end_time),
		).await
	}
}
