// Recording fakes shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::command::PlaybackControl;
use crate::common::{Channel, MediaServer, Records};
use crate::directory::{ChannelDirectory, MediaRelayRegistry};
use crate::engine::{PlaybackInput, PresetInstruction, PtzInstruction, SignalingEngine};
use crate::notify::NotificationHub;



#[derive(Clone)]
#[derive(Debug)]
#[derive(PartialEq)]
pub enum EngineCall {
	AlarmSubscribe(String, u32),
	AlarmUnsubscribe(String),
	Playback(PlaybackInput),
	StopPlayback(Channel),
	PlaybackControl(String, String, PlaybackControl, f64),
	QueryRecordInfo(String, String, i64, i64),
	PtzControl(String, String, PtzInstruction),
	PtzPreset(String, String, PresetInstruction),
}

#[derive(Default)]
pub struct FakeEngine {
	calls: Mutex<Vec<EngineCall>>,
	failure: Option<String>,
	subscribe_delay: Option<Duration>,
}

impl FakeEngine {
	pub fn failing(message: &str) -> Self {
		FakeEngine { failure: Some(message.to_string()), ..Default::default() }
	}

	// Alarm subscribe takes `delay` before it is recorded and answered.
	pub fn delayed(delay: Duration) -> Self {
		FakeEngine { subscribe_delay: Some(delay), ..Default::default() }
	}

	pub fn calls(&self) -> Vec<EngineCall> {
		self.calls.lock().unwrap().clone()
	}

	fn record(&self, call: EngineCall) -> anyhow::Result<()> {
		self.calls.lock().unwrap().push(call);
		match &self.failure {
			Some(message) => Err(anyhow::anyhow!(message.clone())),
			None => Ok(()),
		}
	}
}

#[rocket::async_trait]
impl SignalingEngine for FakeEngine {
	async fn alarm_subscribe(&self, device_id: &str, expire_seconds: u32) -> anyhow::Result<()> {
		if let Some(delay) = self.subscribe_delay {
			tokio::time::sleep(delay).await;
		}
		self.record(EngineCall::AlarmSubscribe(device_id.into(), expire_seconds))
	}

	async fn alarm_unsubscribe(&self, device_id: &str) -> anyhow::Result<()> {
		self.record(EngineCall::AlarmUnsubscribe(device_id.into()))
	}

	async fn playback(&self, input: &PlaybackInput) -> anyhow::Result<()> {
		self.record(EngineCall::Playback(input.clone()))
	}

	async fn stop_playback(&self, channel: &Channel) -> anyhow::Result<()> {
		self.record(EngineCall::StopPlayback(channel.clone()))
	}

	async fn playback_control(&self, device_id: &str, channel_id: &str, control: PlaybackControl, scale: f64) -> anyhow::Result<()> {
		self.record(EngineCall::PlaybackControl(device_id.into(), channel_id.into(), control, scale))
	}

	async fn query_record_info(&self, device_id: &str, channel_id: &str, start_time: i64, end_time: i64) -> anyhow::Result<Records> {
		self.record(EngineCall::QueryRecordInfo(device_id.into(), channel_id.into(), start_time, end_time))?;
		Ok(Records {
			device_id: device_id.to_string(),
			name: "Camera 1".to_string(),
			sum_num: 0,
			items: Vec::new(),
		})
	}

	async fn ptz_control(&self, device_id: &str, channel_id: &str, instruction: PtzInstruction) -> anyhow::Result<()> {
		self.record(EngineCall::PtzControl(device_id.into(), channel_id.into(), instruction))
	}

	async fn ptz_preset(&self, device_id: &str, channel_id: &str, instruction: PresetInstruction) -> anyhow::Result<()> {
		self.record(EngineCall::PtzPreset(device_id.into(), channel_id.into(), instruction))
	}
}

#[derive(Default)]
pub struct FakeHub {
	events: Mutex<Vec<(String, bool)>>,
}

impl FakeHub {
	pub fn events(&self) -> Vec<(String, bool)> {
		self.events.lock().unwrap().clone()
	}
}

impl NotificationHub for FakeHub {
	fn notify_subscription_changed(&self, device_id: &str, subscribed: bool) {
		self.events.lock().unwrap().push((device_id.to_string(), subscribed));
	}
}

pub struct StaticChannels(pub HashMap<String, Channel>);

impl StaticChannels {
	pub fn with(channels: &[Channel]) -> Self {
		StaticChannels(channels.iter().map(|c| (c.id.clone(), c.clone())).collect())
	}
}

#[rocket::async_trait]
impl ChannelDirectory for StaticChannels {
	async fn resolve(&self, id: &str) -> Option<Channel> {
		self.0.get(id).cloned()
	}
}

pub struct StaticRelay(pub Option<MediaServer>);

#[rocket::async_trait]
impl MediaRelayRegistry for StaticRelay {
	async fn get_default(&self) -> Option<MediaServer> {
		self.0.clone()
	}
}

pub fn channel(id: &str) -> Channel {
	Channel {
		id: id.to_string(),
		device_id: "34020000001320000001".to_string(),
		channel_id: "34020000001310000001".to_string(),
		name: None,
	}
}

pub fn relay() -> MediaServer {
	MediaServer {
		id: "local".to_string(),
		ip: "127.0.0.1".to_string(),
		rtp_port: 10000,
		enabled: true,
	}
}
