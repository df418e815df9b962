//! Alarm subscription registry.
//!
//! The signaling engine keeps the authoritative subscription timers. The registry mirrors
//! what was requested so it can report active subscriptions and publish changes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::info;
use tokio::sync::{Mutex, RwLock};

use crate::common::DeviceId;
use crate::engine::{self, SignalingEngine};
use crate::error::{ControlError, Result};
use crate::notify::NotificationHub;



pub const DEFAULT_EXPIRE_SECONDS: u32 = 3600;

#[derive(Clone)]
#[derive(Debug)]
#[derive(PartialEq)]
#[derive(Serialize)]
pub struct AlarmSubscription {
	pub device_id: DeviceId,
	pub expire_seconds: u32,
	pub expires_at: DateTime<Utc>,
}

/// Non-positive requests fall back to an hour; anything past `u32::MAX` is refused.
pub fn effective_expire_seconds(requested: i64) -> Result<u32> {
	if requested <= 0 {
		return Ok(DEFAULT_EXPIRE_SECONDS);
	}
	u32::try_from(requested).map_err(|_| ControlError::InvalidRange {
		field: "expire_seconds",
		min: 1,
		max: u32::MAX as i64,
		value: requested,
	})
}

pub struct AlarmRegistry {
	engine: Arc<dyn SignalingEngine>,
	hub: Arc<dyn NotificationHub>,
	deadline: Duration,
	subscriptions: RwLock<HashMap<DeviceId, AlarmSubscription>>,
	// Held from the engine call until the notification, per device.
	device_locks: Mutex<HashMap<DeviceId, Arc<Mutex<()>>>>,
}

impl AlarmRegistry {
	pub fn new(engine: Arc<dyn SignalingEngine>, hub: Arc<dyn NotificationHub>, deadline: Duration) -> Self {
		AlarmRegistry {
			engine,
			hub,
			deadline,
			subscriptions: RwLock::new(HashMap::new()),
			device_locks: Mutex::new(HashMap::new()),
		}
	}

	async fn device_lock(&self, device_id: &str) -> Arc<Mutex<()>> {
		self.device_locks.lock().await
			.entry(device_id.to_string())
			.or_default()
			.clone()
	}

	/// Subscribes to alarms of `device_id`, replacing any earlier expiry (last writer wins).
	pub async fn subscribe(&self, device_id: &str, expire_seconds: i64) -> Result<AlarmSubscription> {
		if device_id.is_empty() {
			return Err(ControlError::required("device_id"));
		}
		let expire_seconds = effective_expire_seconds(expire_seconds)?;

		let lock = self.device_lock(device_id).await;
		let _guard = lock.lock().await;
		engine::bounded(self.deadline, "alarm subscribe", self.engine.alarm_subscribe(device_id, expire_seconds)).await?;

		let subscription = AlarmSubscription {
			device_id: device_id.to_string(),
			expire_seconds,
			expires_at: Utc::now() + chrono::Duration::seconds(expire_seconds as i64),
		};
		self.subscriptions.write().await.insert(subscription.device_id.clone(), subscription.clone());

		info!("Subscribed to alarms of {} for {}s", device_id, expire_seconds);
		self.hub.notify_subscription_changed(device_id, true);
		Ok(subscription)
	}

	/// Removing a subscription that does not exist is not an error.
	pub async fn unsubscribe(&self, device_id: &str) -> Result<()> {
		if device_id.is_empty() {
			return Err(ControlError::required("device_id"));
		}

		let lock = self.device_lock(device_id).await;
		let _guard = lock.lock().await;
		engine::bounded(self.deadline, "alarm unsubscribe", self.engine.alarm_unsubscribe(device_id)).await?;

		self.subscriptions.write().await.remove(device_id);

		info!("Unsubscribed from alarms of {}", device_id);
		self.hub.notify_subscription_changed(device_id, false);
		Ok(())
	}

	pub async fn get(&self, device_id: &str) -> Option<AlarmSubscription> {
		self.get_at(device_id, Utc::now()).await
	}

	pub async fn active(&self) -> Vec<AlarmSubscription> {
		self.active_at(Utc::now()).await
	}

	async fn get_at(&self, device_id: &str, now: DateTime<Utc>) -> Option<AlarmSubscription> {
		let mut subscriptions = self.subscriptions.write().await;
		let expired = subscriptions.get(device_id).map(|subscription| subscription.expires_at <= now)?;
		if expired {
			subscriptions.remove(device_id);
			return None;
		}
		subscriptions.get(device_id).cloned()
	}

	async fn active_at(&self, now: DateTime<Utc>) -> Vec<AlarmSubscription> {
		let mut subscriptions = self.subscriptions.write().await;
		subscriptions.retain(|_, subscription| subscription.expires_at > now);
		let mut active: Vec<AlarmSubscription> = subscriptions.values().cloned().collect();
		active.sort_by(|a, b| a.device_id.cmp(&b.device_id));
		active
	}
}
