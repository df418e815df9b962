//! Maps the loosely-typed names accepted by the REST API onto the closed command sets
//! understood by the signaling engine, together with the speed/scale/index policies.

use crate::error::{ControlError, Result};



pub const DEFAULT_SPEED: i64 = 50;
pub const MAX_SPEED: i64 = 255;
pub const DEFAULT_SCALE: f64 = 1.0;
pub const MIN_PRESET_INDEX: i64 = 1;
pub const MAX_PRESET_INDEX: i64 = 255;

/// Directional/lens PTZ commands. Discriminants are the GB28181 PTZ instruction byte.
#[derive(Clone, Copy)]
#[derive(Debug)]
#[derive(PartialEq, Eq, Hash)]
pub enum PtzCode {
	Stop = 0x00,
	Right = 0x01,
	Left = 0x02,
	Down = 0x04,
	Up = 0x08,
	ZoomIn = 0x10,
	ZoomOut = 0x20,
	RightDown = 0x05,
	LeftDown = 0x06,
	RightUp = 0x09,
	LeftUp = 0x0A,
	FocusOut = 0x41,
	FocusIn = 0x42,
	IrisIn = 0x44,
	IrisOut = 0x48,
}

#[derive(Clone, Copy)]
#[derive(Debug)]
#[derive(PartialEq, Eq, Hash)]
pub enum PresetAction {
	Set = 0x81,
	Call = 0x82,
	Delete = 0x83,
}

#[derive(Clone, Copy)]
#[derive(Debug)]
#[derive(PartialEq, Eq, Hash)]
#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackControl {
	Play,
	Pause,
	Scale,
}

const PTZ_COMMANDS: &[(&str, PtzCode)] = &[
	("stop", PtzCode::Stop),
	("left", PtzCode::Left),
	("right", PtzCode::Right),
	("up", PtzCode::Up),
	("down", PtzCode::Down),
	("zoom_in", PtzCode::ZoomIn),
	("zoom_out", PtzCode::ZoomOut),
	("left_up", PtzCode::LeftUp),
	("left_down", PtzCode::LeftDown),
	("right_up", PtzCode::RightUp),
	("right_down", PtzCode::RightDown),
	("iris_in", PtzCode::IrisIn),
	("iris_out", PtzCode::IrisOut),
	("focus_in", PtzCode::FocusIn),
	("focus_out", PtzCode::FocusOut),
];

const PRESET_ACTIONS: &[(&str, PresetAction)] = &[
	("set", PresetAction::Set),
	("call", PresetAction::Call),
	("delete", PresetAction::Delete),
];

const PLAYBACK_ACTIONS: &[(&str, PlaybackControl)] = &[
	("play", PlaybackControl::Play),
	("pause", PlaybackControl::Pause),
	("scale", PlaybackControl::Scale),
];

fn lookup<T: Copy>(table: &[(&str, T)], kind: &'static str, name: &str) -> Result<T> {
	table.iter()
		.find(|(key, _)| *key == name)
		.map(|(_, code)| *code)
		.ok_or_else(|| ControlError::UnsupportedCommand { kind, name: name.to_string() })
}

impl PtzCode {
	pub fn code(self) -> u8 {
		self as u8
	}
}

impl PresetAction {
	pub fn code(self) -> u8 {
		self as u8
	}
}

pub fn map_ptz_command(name: &str) -> Result<PtzCode> {
	lookup(PTZ_COMMANDS, "ptz command", name)
}

pub fn map_preset_action(name: &str) -> Result<PresetAction> {
	lookup(PRESET_ACTIONS, "preset action", name)
}

pub fn map_playback_action(name: &str) -> Result<PlaybackControl> {
	lookup(PLAYBACK_ACTIONS, "playback action", name)
}

/// Resolves a playback action together with the scale to send along with it.
/// Only `scale` carries a meaningful value; a missing or non-positive scale becomes 1.0.
/// There is no upper bound here, the engine decides what it accepts.
pub fn map_playback_control(name: &str, scale: f64) -> Result<(PlaybackControl, f64)> {
	let control = map_playback_action(name)?;
	let scale = match control {
		PlaybackControl::Scale if scale <= 0.0 => DEFAULT_SCALE,
		_ => scale,
	};
	Ok((control, scale))
}

pub fn require_target(device_id: &str, channel_id: &str) -> Result<()> {
	if device_id.is_empty() {
		return Err(ControlError::required("device_id"));
	}
	if channel_id.is_empty() {
		return Err(ControlError::required("channel_id"));
	}
	Ok(())
}

pub fn clamp_speed(v: i64) -> u8 {
	if v <= 0 {
		DEFAULT_SPEED as u8
	} else if v > MAX_SPEED {
		MAX_SPEED as u8
	} else {
		v as u8
	}
}

pub fn validate_preset_index(v: i64) -> Result<u8> {
	if (MIN_PRESET_INDEX..=MAX_PRESET_INDEX).contains(&v) {
		Ok(v as u8)
	} else {
		Err(ControlError::InvalidRange {
			field: "preset_index",
			min: MIN_PRESET_INDEX,
			max: MAX_PRESET_INDEX,
			value: v,
		})
	}
}
