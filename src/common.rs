use std::collections::HashMap;



pub type DeviceId = String;
pub type ChannelKey = String;
pub type ChannelMap = HashMap<ChannelKey, Channel>;

// A channel as listed by the channel directory.
// `id` is the platform-wide key, `device_id`/`channel_id` are the GB28181 codes the engine addresses.
#[derive(Clone)]
#[derive(Debug)]
#[derive(PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct Channel {
	pub id: ChannelKey,
	pub device_id: DeviceId,
	pub channel_id: String,
	#[serde(default)]
	pub name: Option<String>,
}

#[derive(Clone)]
#[derive(Debug)]
#[derive(PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct MediaServer {
	pub id: String,
	pub ip: String,
	pub rtp_port: u16,
	#[serde(default = "default_enabled")]
	pub enabled: bool,
}

fn default_enabled() -> bool {
	true
}

// How the media relay receives the device's RTP stream.
#[derive(Clone, Copy)]
#[derive(Debug)]
#[derive(PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamMode {
	Udp,
	TcpPassive,
	TcpActive,
}

#[derive(Clone)]
#[derive(Debug)]
#[derive(PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct RecordItem {
	pub device_id: String,
	pub name: String,
	#[serde(default)]
	pub file_path: String,
	#[serde(default)]
	pub address: String,
	pub start_time: String,
	pub end_time: String,
	#[serde(default)]
	pub secrecy: i32,
	#[serde(rename = "type", default)]
	pub record_type: String,
}

// Record listing as returned by the engine's RecordInfo query.
#[derive(Clone)]
#[derive(Debug)]
#[derive(PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct Records {
	pub device_id: String,
	#[serde(default)]
	pub name: String,
	pub sum_num: u32,
	#[serde(default)]
	pub items: Vec<RecordItem>,
}
