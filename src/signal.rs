//! Cross-instance logout broadcast.
//!
//! Logging out in one application instance must eventually log out every other instance that
//! shares the same storage origin. Two channels carry the signal: a publish/subscribe
//! [`LogoutBroadcast`] for instances that are listening right now, and a timestamp written to
//! shared storage for instances that only re-check on their next interaction (poll-on-focus).
//! Delivery is best-effort on both.

// crates.io
use tokio::sync::broadcast::{self, Receiver, Sender, error::TryRecvError};
// self
use crate::_prelude::*;

const CHANNEL_CAPACITY: usize = 16;

/// A logout event, stamped with millisecond precision so it survives a storage round trip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutSignal {
	/// When the logout happened.
	pub at: OffsetDateTime,
}
impl LogoutSignal {
	/// Signal stamped with the current UTC time.
	pub fn now() -> Self {
		Self::at(OffsetDateTime::now_utc())
	}

	/// Signal stamped with `at`, truncated to milliseconds.
	pub fn at(at: OffsetDateTime) -> Self {
		Self { at: at.replace_millisecond(at.millisecond()).unwrap_or(at) }
	}

	/// Unix milliseconds, the form written to shared storage.
	pub fn to_storage_value(&self) -> String {
		(self.at.unix_timestamp_nanos() / 1_000_000).to_string()
	}

	/// Parses the stored form; anything unparsable is treated as no signal.
	pub fn from_storage_value(value: &str) -> Option<Self> {
		let millis = value.trim().parse::<i128>().ok()?;
		let at = OffsetDateTime::from_unix_timestamp_nanos(millis.checked_mul(1_000_000)?).ok()?;

		Some(Self { at })
	}
}

/// Publish/subscribe channel shared by all instances of one storage origin.
///
/// Clones publish into, and subscribe from, the same channel.
#[derive(Clone, Debug)]
pub struct LogoutBroadcast {
	sender: Sender<LogoutSignal>,
}
impl LogoutBroadcast {
	/// Creates a channel that buffers up to `capacity` undelivered signals per subscriber.
	pub fn with_capacity(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity.max(1));

		Self { sender }
	}

	/// Publishes a signal, returning how many subscribers were listening.
	pub fn publish(&self, signal: LogoutSignal) -> usize {
		self.sender.send(signal).unwrap_or(0)
	}

	/// Starts listening for signals published after this call.
	pub fn subscribe(&self) -> LogoutSubscription {
		LogoutSubscription { receiver: self.sender.subscribe() }
	}

	/// Number of live subscriptions.
	pub fn subscriber_count(&self) -> usize {
		self.sender.receiver_count()
	}
}
impl Default for LogoutBroadcast {
	fn default() -> Self {
		Self::with_capacity(CHANNEL_CAPACITY)
	}
}

/// Receiving half of a [`LogoutBroadcast`] held by one application instance.
#[derive(Debug)]
pub struct LogoutSubscription {
	receiver: Receiver<LogoutSignal>,
}
impl LogoutSubscription {
	/// Drains pending signals without waiting and returns the most recent one.
	pub fn try_next(&mut self) -> Option<LogoutSignal> {
		let mut latest = None;

		loop {
			match self.receiver.try_recv() {
				Ok(signal) => latest = Some(signal),
				Err(TryRecvError::Lagged(_)) => continue,
				Err(TryRecvError::Empty | TryRecvError::Closed) => break,
			}
		}

		latest
	}

	/// Waits for the next signal; `None` once every publisher is gone.
	pub async fn next(&mut self) -> Option<LogoutSignal> {
		loop {
			match self.receiver.recv().await {
				Ok(signal) => return Some(signal),
				Err(broadcast::error::RecvError::Lagged(_)) => continue,
				Err(broadcast::error::RecvError::Closed) => return None,
			}
		}
	}
}
