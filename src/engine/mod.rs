//! Contract of the GB28181 signaling engine this service drives.
//!
//! The engine owns SIP dialogs, the PTZ byte encoding and media negotiation. This crate only
//! hands it validated, normalized commands, and bounds every call with a deadline.

use std::future::Future;
use std::time::Duration;

use log::error;

use crate::command::{PlaybackControl, PresetAction, PtzCode};
use crate::common::{Channel, MediaServer, Records, StreamMode};
use crate::error::{ControlError, Result};

mod http;

pub use self::http::HttpSignalingEngine;



#[derive(Clone, Copy)]
#[derive(Debug)]
#[derive(PartialEq, Eq)]
pub struct PtzInstruction {
	pub code: PtzCode,
	pub speed_h: u8,
	pub speed_v: u8,
	pub speed_z: u8,
}

#[derive(Clone, Copy)]
#[derive(Debug)]
#[derive(PartialEq, Eq)]
pub struct PresetInstruction {
	pub action: PresetAction,
	pub index: u8,
}

#[derive(Clone)]
#[derive(Debug)]
#[derive(PartialEq)]
pub struct PlaybackInput {
	pub channel: Channel,
	pub media_server: MediaServer,
	pub stream_mode: StreamMode,
	pub start_time: i64,
	pub end_time: i64,
}

#[rocket::async_trait]
pub trait SignalingEngine: Send + Sync {
	async fn alarm_subscribe(&self, device_id: &str, expire_seconds: u32) -> anyhow::Result<()>;
	async fn alarm_unsubscribe(&self, device_id: &str) -> anyhow::Result<()>;

	async fn playback(&self, input: &PlaybackInput) -> anyhow::Result<()>;
	async fn stop_playback(&self, channel: &Channel) -> anyhow::Result<()>;
	async fn playback_control(&self, device_id: &str, channel_id: &str, control: PlaybackControl, scale: f64) -> anyhow::Result<()>;
	async fn query_record_info(&self, device_id: &str, channel_id: &str, start_time: i64, end_time: i64) -> anyhow::Result<Records>;

	async fn ptz_control(&self, device_id: &str, channel_id: &str, instruction: PtzInstruction) -> anyhow::Result<()>;
	async fn ptz_preset(&self, device_id: &str, channel_id: &str, instruction: PresetInstruction) -> anyhow::Result<()>;
}

/// Runs one engine call under `deadline`. Engine failures and timeouts both surface as
/// `ControlError::Server`; nothing is retried.
pub async fn bounded<T, F>(deadline: Duration, operation: &'static str, call: F) -> Result<T>
where
	F: Future<Output = anyhow::Result<T>>,
{
	match tokio::time::timeout(deadline, call).await {
		Ok(Ok(value)) => Ok(value),
		Ok(Err(err)) => {
			error!("Signaling engine {} failed; error was {}", operation, err);
			Err(ControlError::server(err))
		},
		Err(_) => {
			error!("Signaling engine {} timed out after {:?}", operation, deadline);
			Err(ControlError::Server(format!("signaling engine {} timed out after {:?}", operation, deadline)))
		},
	}
}
