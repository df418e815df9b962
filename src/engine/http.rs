use std::time::Duration;

use anyhow::Context;
use log::debug;
use reqwest::Client;
use rocket::serde::json::{json, Value};
use url::Url;

use super::{PlaybackInput, PresetInstruction, PtzInstruction, SignalingEngine};
use crate::command::PlaybackControl;
use crate::common::{Channel, Records};



/// Talks to a signaling engine that exposes its control surface as JSON over HTTP.
pub struct HttpSignalingEngine {
	base: Url,
	client: Client,
}

impl HttpSignalingEngine {
	/// `base` is treated as a directory even without a trailing slash, so `http://h/api`
	/// resolves `ptz/control` to `http://h/api/ptz/control`.
	pub fn new(mut base: Url, timeout: Duration) -> anyhow::Result<Self> {
		if !base.path().ends_with('/') {
			let path = format!("{}/", base.path());
			base.set_path(&path);
		}
		let client = Client::builder()
			.connect_timeout(Duration::from_secs(3))
			.timeout(timeout)
			.build()?;
		Ok(HttpSignalingEngine { base, client })
	}

	fn endpoint(&self, path: &str) -> anyhow::Result<Url> {
		self.base.join(path).with_context(|| format!("invalid engine endpoint {}", path))
	}

	async fn post(&self, path: &str, body: Value) -> anyhow::Result<()> {
		let url = self.endpoint(path)?;
		let response = self.client.post(url.clone()).json(&body).send().await?;
		let status = response.status();
		if status.is_success() {
			debug!("Engine call {} succeeded", url);
			return Ok(());
		}
		let text = response.text().await.unwrap_or_default();
		if text.is_empty() {
			anyhow::bail!("engine returned {}", status);
		}
		anyhow::bail!(text)
	}
}

#[rocket::async_trait]
impl SignalingEngine for HttpSignalingEngine {
	async fn alarm_subscribe(&self, device_id: &str, expire_seconds: u32) -> anyhow::Result<()> {
		self.post("alarm/subscribe", json!({
			"device_id": device_id,
			"expires": expire_seconds,
		})).await
	}

	async fn alarm_unsubscribe(&self, device_id: &str) -> anyhow::Result<()> {
		self.post("alarm/unsubscribe", json!({ "device_id": device_id })).await
	}

	async fn playback(&self, input: &PlaybackInput) -> anyhow::Result<()> {
		self.post("playback/start", json!({
			"channel": input.channel,
			"media_server": input.media_server,
			"stream_mode": input.stream_mode,
			"start_time": input.start_time,
			"end_time": input.end_time,
		})).await
	}

	async fn stop_playback(&self, channel: &Channel) -> anyhow::Result<()> {
		self.post("playback/stop", json!({ "channel": channel })).await
	}

	async fn playback_control(&self, device_id: &str, channel_id: &str, control: PlaybackControl, scale: f64) -> anyhow::Result<()> {
		self.post("playback/control", json!({
			"device_id": device_id,
			"channel_id": channel_id,
			"control": control,
			"scale": scale,
		})).await
	}

	async fn query_record_info(&self, device_id: &str, channel_id: &str, start_time: i64, end_time: i64) -> anyhow::Result<Records> {
		let url = self.endpoint("record/info")?;
		let response = self.client.get(url)
			.query(&[("device_id", device_id), ("channel_id", channel_id)])
			.query(&[("start_time", start_time), ("end_time", end_time)])
			.send()
			.await?;
		let status = response.status();
		if !status.is_success() {
			let text = response.text().await.unwrap_or_default();
			anyhow::bail!(if text.is_empty() { format!("engine returned {}", status) } else { text });
		}
		Ok(response.json::<Records>().await?)
	}

	async fn ptz_control(&self, device_id: &str, channel_id: &str, instruction: PtzInstruction) -> anyhow::Result<()> {
		self.post("ptz/control", json!({
			"device_id": device_id,
			"channel_id": channel_id,
			"code": instruction.code.code(),
			"speed_h": instruction.speed_h,
			"speed_v": instruction.speed_v,
			"speed_z": instruction.speed_z,
		})).await
	}

	async fn ptz_preset(&self, device_id: &str, channel_id: &str, instruction: PresetInstruction) -> anyhow::Result<()> {
		self.post("ptz/preset", json!({
			"device_id": device_id,
			"channel_id": channel_id,
			"code": instruction.action.code(),
			"index": instruction.index,
		})).await
	}
}



#[cfg(test)]
mod tests {
	use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
	use tokio::net::TcpListener;
	use tokio::task::JoinHandle;

	use super::*;

	// Answers a single request with `status` and `body`, then hands back what it received.
	async fn serve_once(status: &'static str, body: &'static str) -> (Url, JoinHandle<String>) {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let base = Url::parse(&format!("http://{}/api", listener.local_addr().unwrap())).unwrap();
		let server = tokio::spawn(async move {
			let (stream, _) = listener.accept().await.unwrap();
			let mut reader = BufReader::new(stream);
			let mut received = String::new();
			let mut content_length = 0;
			loop {
				let mut line = String::new();
				reader.read_line(&mut line).await.unwrap();
				if line.is_empty() || line == "\r\n" {
					break;
				}
				if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
					content_length = value.trim().parse().unwrap();
				}
				received.push_str(&line);
			}
			let mut payload = vec![0; content_length];
			reader.read_exact(&mut payload).await.unwrap();
			received.push_str(&String::from_utf8(payload).unwrap());

			let response = format!(
				"HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
				status, body.len(), body,
			);
			reader.get_mut().write_all(response.as_bytes()).await.unwrap();
			received
		});
		(base, server)
	}

	#[test]
	fn endpoints_are_relative_to_base() {
		let base = Url::parse("http://10.0.0.5:15060/api/").unwrap();
		let engine = HttpSignalingEngine::new(base, Duration::from_secs(5)).unwrap();
		assert_eq!(engine.endpoint("ptz/control").unwrap().as_str(), "http://10.0.0.5:15060/api/ptz/control");
		assert_eq!(engine.endpoint("record/info").unwrap().as_str(), "http://10.0.0.5:15060/api/record/info");
	}

	#[test]
	fn base_without_trailing_slash_keeps_its_path() {
		let base = Url::parse("http://10.0.0.5:15060/api").unwrap();
		let engine = HttpSignalingEngine::new(base, Duration::from_secs(5)).unwrap();
		assert_eq!(engine.endpoint("ptz/control").unwrap().as_str(), "http://10.0.0.5:15060/api/ptz/control");

		let base = Url::parse("http://127.0.0.1:15060").unwrap();
		let engine = HttpSignalingEngine::new(base, Duration::from_secs(5)).unwrap();
		assert_eq!(engine.endpoint("alarm/subscribe").unwrap().as_str(), "http://127.0.0.1:15060/alarm/subscribe");
	}

	#[rocket::async_test]
	async fn subscribe_posts_json_to_engine() {
		let (base, server) = serve_once("200 OK", "{}").await;
		let engine = HttpSignalingEngine::new(base, Duration::from_secs(5)).unwrap();

		engine.alarm_subscribe("cam-01", 60).await.unwrap();

		let received = server.await.unwrap();
		assert!(received.starts_with("POST /api/alarm/subscribe HTTP/1.1"));
		assert!(received.ends_with(r#"{"device_id":"cam-01","expires":60}"#));
	}

	#[rocket::async_test]
	async fn error_status_carries_engine_body() {
		let (base, server) = serve_once("500 Internal Server Error", "device 3402 offline").await;
		let engine = HttpSignalingEngine::new(base, Duration::from_secs(5)).unwrap();

		let err = engine.ptz_control("dev1", "ch1", PtzInstruction {
			code: crate::command::PtzCode::Up,
			speed_h: 50,
			speed_v: 50,
			speed_z: 0,
		}).await.unwrap_err();
		assert_eq!(err.to_string(), "device 3402 offline");
		assert!(server.await.unwrap().starts_with("POST /api/ptz/control "));
	}

	#[rocket::async_test]
	async fn error_status_without_body_names_the_status() {
		let (base, server) = serve_once("500 Internal Server Error", "").await;
		let engine = HttpSignalingEngine::new(base, Duration::from_secs(5)).unwrap();

		let err = engine.alarm_unsubscribe("cam-01").await.unwrap_err();
		assert_eq!(err.to_string(), "engine returned 500 Internal Server Error");
		server.await.unwrap();
	}

	#[rocket::async_test]
	async fn record_query_decodes_engine_listing() {
		let body = r#"{"device_id":"dev1","name":"Gate","sum_num":1,"items":[{"device_id":"ch1","name":"Gate","start_time":"2023-11-14T22:13:20","end_time":"2023-11-14T22:43:20","type":"time"}]}"#;
		let (base, server) = serve_once("200 OK", body).await;
		let engine = HttpSignalingEngine::new(base, Duration::from_secs(5)).unwrap();

		let records = engine.query_record_info("dev1", "ch1", 1700000000, 1700001800).await.unwrap();
		assert_eq!(records.sum_num, 1);
		assert_eq!(records.items.len(), 1);
		assert_eq!(records.items[0].record_type, "time");

		let received = server.await.unwrap();
		assert!(received.starts_with(
			"GET /api/record/info?device_id=dev1&channel_id=ch1&start_time=1700000000&end_time=1700001800 HTTP/1.1"
		));
	}

	#[rocket::async_test]
	async fn record_query_error_without_body_names_the_status() {
		let (base, server) = serve_once("404 Not Found", "").await;
		let engine = HttpSignalingEngine::new(base, Duration::from_secs(5)).unwrap();

		let err = engine.query_record_info("dev1", "ch1", 0, 1).await.unwrap_err();
		assert_eq!(err.to_string(), "engine returned 404 Not Found");
		server.await.unwrap();
	}
}
