use log::debug;
use tokio::sync::broadcast;



#[derive(Clone)]
#[derive(Debug)]
#[derive(PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct SubscriptionChanged {
	pub device_id: String,
	pub subscribed: bool,
}

/// Downstream fan-out of subscription changes. Delivery is one-way: implementors absorb
/// their own failures and never report them back to the caller.
pub trait NotificationHub: Send + Sync {
	fn notify_subscription_changed(&self, device_id: &str, subscribed: bool);
}

/// Publishes changes on a broadcast channel; each listener (an SSE client, a bridge to some
/// other push service) holds its own receiver.
pub struct BroadcastHub {
	sender: broadcast::Sender<SubscriptionChanged>,
}

impl BroadcastHub {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		BroadcastHub { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<SubscriptionChanged> {
		self.sender.subscribe()
	}
}

impl NotificationHub for BroadcastHub {
	fn notify_subscription_changed(&self, device_id: &str, subscribed: bool) {
		let event = SubscriptionChanged { device_id: device_id.to_string(), subscribed };
		// Err only means nobody is listening right now
		if let Err(err) = self.sender.send(event) {
			debug!("No listeners for subscription change of {}; dropped {:?}", device_id, err.0);
		}
	}
}
