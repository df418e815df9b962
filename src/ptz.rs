use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::command;
use crate::engine::{self, PresetInstruction, PtzInstruction, SignalingEngine};
use crate::error::Result;



#[derive(Clone)]
#[derive(Debug)]
#[derive(PartialEq, Eq)]
#[derive(Serialize)]
pub struct Preset {
	pub index: u8,
	pub name: String,
}

pub struct PtzDispatch {
	engine: Arc<dyn SignalingEngine>,
	deadline: Duration,
}

impl PtzDispatch {
	pub fn new(engine: Arc<dyn SignalingEngine>, deadline: Duration) -> Self {
		PtzDispatch { engine, deadline }
	}

	/// Pan/tilt use the same clamped speed; zoom speed is always 0.
	pub async fn control(&self, device_id: &str, channel_id: &str, command_name: &str, speed: i64) -> Result<()> {
		command::require_target(device_id, channel_id)?;
		let code = command::map_ptz_command(command_name)?;
		let speed = command::clamp_speed(speed);

		let instruction = PtzInstruction { code, speed_h: speed, speed_v: speed, speed_z: 0 };
		engine::bounded(self.deadline, "ptz control", self.engine.ptz_control(device_id, channel_id, instruction)).await?;

		debug!("PTZ {:?} at speed {} sent to {}/{}", code, speed, device_id, channel_id);
		Ok(())
	}

	pub async fn preset(&self, device_id: &str, channel_id: &str, action_name: &str, preset_index: i64) -> Result<()> {
		command::require_target(device_id, channel_id)?;
		let index = command::validate_preset_index(preset_index)?;
		let action = command::map_preset_action(action_name)?;

		let instruction = PresetInstruction { action, index };
		engine::bounded(self.deadline, "ptz preset", self.engine.ptz_preset(device_id, channel_id, instruction)).await?;

		info!("Preset {:?} #{} sent to {}/{}", action, index, device_id, channel_id);
		Ok(())
	}

	// TODO: query presets through the engine once it can issue PresetQuery requests
	pub async fn query_presets(&self, device_id: &str, channel_id: &str) -> Result<Vec<Preset>> {
		command::require_target(device_id, channel_id)?;
		debug!("Preset query for {}/{} is not implemented yet", device_id, channel_id);
		Ok(Vec::new())
	}
}
