use std::sync::Arc;

use log::warn;
use rocket::response::stream::{Event, EventStream};
use rocket::serde::json::{json, Json, Value};
use rocket::tokio::select;
use rocket::tokio::sync::broadcast::error::RecvError;
use rocket::{Request, Shutdown, State};

use crate::alarm::{AlarmRegistry, AlarmSubscription};
use crate::common::Records;
use crate::error::ControlError;
use crate::notify::BroadcastHub;
use crate::playback::{PlaybackOrchestrator, SessionDescriptor};
use crate::ptz::PtzDispatch;



type ApiResult<T> = Result<T, ControlError>;

fn ok() -> Value {
	json!({ "msg": "ok" })
}



#[derive(Debug)]
#[derive(Deserialize)]
struct AlarmSubscribeInput {
	device_id: String,
	#[serde(default)]
	expire_seconds: i64,
}

#[derive(Debug)]
#[derive(Deserialize)]
struct AlarmUnsubscribeInput {
	device_id: String,
}

#[post("/subscribe", data = "<input>")]
async fn alarm_subscribe(input: Json<AlarmSubscribeInput>, alarms: &State<AlarmRegistry>) -> ApiResult<Value> {
	let subscription = alarms.subscribe(&input.device_id, input.expire_seconds).await?;
	Ok(json!({ "msg": "ok", "expires": subscription.expire_seconds }))
}

#[post("/unsubscribe", data = "<input>")]
async fn alarm_unsubscribe(input: Json<AlarmUnsubscribeInput>, alarms: &State<AlarmRegistry>) -> ApiResult<Value> {
	alarms.unsubscribe(&input.device_id).await?;
	Ok(ok())
}

#[get("/subscriptions")]
async fn list_subscriptions(alarms: &State<AlarmRegistry>) -> Json<Vec<AlarmSubscription>> {
	Json(alarms.active().await)
}

#[get("/subscriptions/<device_id>")]
async fn get_subscription(device_id: &str, alarms: &State<AlarmRegistry>) -> Option<Json<AlarmSubscription>> {
	alarms.get(device_id).await.map(Json)
}

#[get("/events")]
fn subscription_events(hub: &State<Arc<BroadcastHub>>, mut shutdown: Shutdown) -> EventStream![] {
	let mut changes = hub.subscribe();
	EventStream! {
		loop {
			let change = select! {
				received = changes.recv() => match received {
					Ok(change) => change,
					Err(RecvError::Closed) => break,
					Err(RecvError::Lagged(skipped)) => {
						warn!("Subscription event listener lagged, skipped {} events", skipped);
						continue;
					},
				},
				_ = &mut shutdown => break,
			};
			yield Event::json(&change).event("subscription");
		}
	}
}



#[derive(Debug)]
#[derive(Deserialize)]
struct StartPlaybackInput {
	channel_id: String,
	start_time: i64,
	end_time: i64,
}

#[derive(Debug)]
#[derive(Deserialize)]
struct StopPlaybackInput {
	channel_id: String,
}

#[derive(Debug)]
#[derive(Deserialize)]
struct PlaybackControlInput {
	device_id: String,
	channel_id: String,
	action: String,
	#[serde(default)]
	scale: f64,
}

#[derive(Debug)]
#[derive(FromForm)]
struct RecordQuery {
	device_id: String,
	channel_id: String,
	start_time: i64,
	end_time: i64,
}

#[post("/start", data = "<input>")]
async fn start_playback(input: Json<StartPlaybackInput>, playback: &State<PlaybackOrchestrator>) -> ApiResult<Json<SessionDescriptor>> {
	let session = playback.start(&input.channel_id, input.start_time, input.end_time).await?;
	Ok(Json(session))
}

#[post("/stop", data = "<input>")]
async fn stop_playback(input: Json<StopPlaybackInput>, playback: &State<PlaybackOrchestrator>) -> ApiResult<Value> {
	playback.stop(&input.channel_id).await?;
	Ok(ok())
}

#[post("/control", data = "<input>")]
async fn playback_control(input: Json<PlaybackControlInput>, playback: &State<PlaybackOrchestrator>) -> ApiResult<Value> {
	playback.control(&input.device_id, &input.channel_id, &input.action, input.scale).await?;
	Ok(ok())
}

#[get("/records?<query..>")]
async fn query_records(query: RecordQuery, playback: &State<PlaybackOrchestrator>) -> ApiResult<Json<Records>> {
	let records = playback.query_records(&query.device_id, &query.channel_id, query.start_time, query.end_time).await?;
	Ok(Json(records))
}



#[derive(Debug)]
#[derive(Deserialize)]
struct PtzControlInput {
	device_id: String,
	channel_id: String,
	command: String,
	#[serde(default)]
	speed: i64,
}

#[derive(Debug)]
#[derive(Deserialize)]
struct PtzPresetInput {
	device_id: String,
	channel_id: String,
	action: String,
	preset_index: i64,
}

#[derive(Debug)]
#[derive(FromForm)]
struct PresetQuery {
	device_id: String,
	channel_id: String,
}

#[post("/control", data = "<input>")]
async fn ptz_control(input: Json<PtzControlInput>, ptz: &State<PtzDispatch>) -> ApiResult<Value> {
	ptz.control(&input.device_id, &input.channel_id, &input.command, input.speed).await?;
	Ok(ok())
}

#[post("/preset", data = "<input>")]
async fn ptz_preset(input: Json<PtzPresetInput>, ptz: &State<PtzDispatch>) -> ApiResult<Value> {
	ptz.preset(&input.device_id, &input.channel_id, &input.action, input.preset_index).await?;
	Ok(ok())
}

#[get("/presets?<query..>")]
async fn query_presets(query: PresetQuery, ptz: &State<PtzDispatch>) -> ApiResult<Value> {
	let presets = ptz.query_presets(&query.device_id, &query.channel_id).await?;
	Ok(json!({
		"msg": "preset query is not implemented yet",
		"presets": presets,
	}))
}



#[catch(400)]
fn bad_request() -> Value {
	json!({
		"status": "error",
		"reason": "Request could not be understood."
	})
}

#[catch(404)]
fn not_found() -> Value {
	json!({
		"status": "error",
		"reason": "Resource was not found."
	})
}

#[catch(422)]
fn unprocessable(request: &Request) -> Value {
	json!({
		"status": "error",
		"reason": format!("Malformed or missing fields in request to {}.", request.uri().path())
	})
}

#[catch(500)]
fn internal_error() -> Value {
	json!({
		"status": "error",
		"reason": "Internal server error."
	})
}



pub struct Components {
	pub alarms: AlarmRegistry,
	pub playback: PlaybackOrchestrator,
	pub ptz: PtzDispatch,
	pub hub: Arc<BroadcastHub>,
}

pub fn stage(components: Components) -> rocket::fairing::AdHoc {
	rocket::fairing::AdHoc::on_ignite("Device control API", |rocket| async move {
		rocket
			.manage(components.alarms)
			.manage(components.playback)
			.manage(components.ptz)
			.manage(components.hub)
			.register("/", catchers![bad_request, not_found, unprocessable, internal_error])
			.mount("/alarms", routes![alarm_subscribe, alarm_unsubscribe, list_subscriptions, get_subscription, subscription_events])
			.mount("/playback", routes![start_playback, stop_playback, playback_control, query_records])
			.mount("/ptz", routes![ptz_control, ptz_preset, query_presets])
	})
}
