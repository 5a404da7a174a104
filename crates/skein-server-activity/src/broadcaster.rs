// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-process pub/sub for activity events.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        ActivityBroadcaster                          │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │    channels: HashMap<ActivityChannel, broadcast::Sender>      │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! │                                │                                    │
//! │  publish(event) ───────────────┼──────────> event.channel sender    │
//! └────────────────────────────────┼────────────────────────────────────┘
//!                                  ▼
//!        ┌──────────────────┐ ┌──────────────────┐ ┌───────────────────────┐
//!        │ COMMENT_ACTIVITY │ │ VIEWER_ACTIVITY  │ │ COMMENT_THREAD_ACTIVITY│
//!        └──────────────────┘ └──────────────────┘ └───────────────────────┘
//! ```
//!
//! The broadcaster fans out every event to every receiver on its channel. It
//! does not filter or authorize; that is the gate's job. Each receiver has its
//! own bounded buffer, so a slow subscriber lags (and skips) on its own
//! without holding up the others.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use skein_server_config::ActivityConfig;
use tokio::sync::{broadcast, RwLock};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};

use crate::event::{ActivityChannel, ActivityEvent};

/// A source of activity events, one stream per subscription.
#[async_trait]
pub trait ActivitySource: Send + Sync {
	/// Starts receiving `channel`. Events published after this returns are
	/// delivered in publish order.
	async fn subscribe(&self, channel: ActivityChannel) -> BoxStream<'static, ActivityEvent>;
}

/// Statistics for a broadcast channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelStats {
	/// Number of active receivers.
	pub receiver_count: usize,
	/// Total events sent on this channel.
	pub events_sent: u64,
	/// When the channel was created.
	pub created_at: DateTime<Utc>,
	/// Last event timestamp.
	pub last_event_at: Option<DateTime<Utc>>,
}

struct ChannelState {
	sender: broadcast::Sender<ActivityEvent>,
	created_at: DateTime<Utc>,
	events_sent: AtomicU64,
	last_event_at: Mutex<Option<DateTime<Utc>>>,
}

impl ChannelState {
	fn new(capacity: usize) -> Self {
		let (sender, _receiver) = broadcast::channel(capacity);
		Self {
			sender,
			created_at: Utc::now(),
			events_sent: AtomicU64::new(0),
			last_event_at: Mutex::new(None),
		}
	}

	fn record_send(&self, at: DateTime<Utc>) {
		self.events_sent.fetch_add(1, Ordering::Relaxed);
		*self.last_event_at.lock().unwrap_or_else(|e| e.into_inner()) = Some(at);
	}

	fn stats(&self) -> ChannelStats {
		ChannelStats {
			receiver_count: self.sender.receiver_count(),
			events_sent: self.events_sent.load(Ordering::Relaxed),
			created_at: self.created_at,
			last_event_at: *self.last_event_at.lock().unwrap_or_else(|e| e.into_inner()),
		}
	}
}

/// Global broadcaster stats for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcasterStats {
	/// Total number of active channels.
	pub channel_count: usize,
	/// Total number of connected receivers.
	pub total_receivers: usize,
	/// Total events sent since start.
	pub total_events_sent: u64,
	/// Total subscriptions ever made.
	pub total_subscriptions: u64,
}

/// Fans activity events out to subscribers, one broadcast channel per
/// [`ActivityChannel`].
pub struct ActivityBroadcaster {
	capacity: usize,
	channels: RwLock<HashMap<ActivityChannel, ChannelState>>,
	total_events: AtomicU64,
	total_subscriptions: AtomicU64,
}

impl ActivityBroadcaster {
	pub fn new(capacity: usize) -> Self {
		Self {
			capacity: capacity.max(1),
			channels: RwLock::new(HashMap::new()),
			total_events: AtomicU64::new(0),
			total_subscriptions: AtomicU64::new(0),
		}
	}

	pub fn from_config(config: &ActivityConfig) -> Self {
		Self::new(config.channel_capacity)
	}

	pub fn with_defaults() -> Self {
		Self::from_config(&ActivityConfig::default())
	}

	/// Subscribes a raw receiver to `channel`, creating the channel on first
	/// use.
	pub async fn subscribe_receiver(
		&self,
		channel: ActivityChannel,
	) -> broadcast::Receiver<ActivityEvent> {
		{
			let channels = self.channels.read().await;
			if let Some(state) = channels.get(&channel) {
				self.total_subscriptions.fetch_add(1, Ordering::Relaxed);
				debug!(
					channel = %channel,
					receiver_count = state.sender.receiver_count(),
					"subscribed to existing activity channel"
				);
				return state.sender.subscribe();
			}
		}

		let mut channels = self.channels.write().await;
		self.total_subscriptions.fetch_add(1, Ordering::Relaxed);

		// Another task may have created it while we waited for the write lock.
		if let Some(state) = channels.get(&channel) {
			return state.sender.subscribe();
		}

		let state = ChannelState::new(self.capacity);
		let receiver = state.sender.subscribe();
		channels.insert(channel, state);

		info!(
			channel = %channel,
			capacity = self.capacity,
			"created activity broadcast channel"
		);

		receiver
	}

	/// Publishes `event` on its channel.
	///
	/// Returns the number of receivers reached; 0 when nobody is subscribed.
	pub async fn publish(&self, event: ActivityEvent) -> usize {
		let channel = event.channel;
		let channels = self.channels.read().await;

		let Some(state) = channels.get(&channel) else {
			debug!(
				channel = %channel,
				event_type = %event.event_type,
				"no channel exists for activity event"
			);
			return 0;
		};

		if state.sender.receiver_count() == 0 {
			debug!(
				channel = %channel,
				event_type = %event.event_type,
				"no receivers for activity event"
			);
			return 0;
		}

		let event_type = event.event_type;
		let stream_id = event.stream_id;
		let at = event.created_at;
		match state.sender.send(event) {
			Ok(count) => {
				state.record_send(at);
				self.total_events.fetch_add(1, Ordering::Relaxed);
				debug!(
					channel = %channel,
					event_type = %event_type,
					stream_id = %stream_id,
					receiver_count = count,
					"published activity event"
				);
				count
			}
			Err(_) => {
				debug!(channel = %channel, "receivers dropped before send");
				0
			}
		}
	}

	pub async fn channel_stats(&self, channel: ActivityChannel) -> Option<ChannelStats> {
		self.channels.read().await.get(&channel).map(ChannelState::stats)
	}

	pub async fn channel_count(&self) -> usize {
		self.channels.read().await.len()
	}

	pub async fn total_receiver_count(&self) -> usize {
		let channels = self.channels.read().await;
		channels.values().map(|s| s.sender.receiver_count()).sum()
	}

	pub fn total_events_sent(&self) -> u64 {
		self.total_events.load(Ordering::Relaxed)
	}

	pub fn total_subscriptions(&self) -> u64 {
		self.total_subscriptions.load(Ordering::Relaxed)
	}

	pub async fn stats(&self) -> BroadcasterStats {
		BroadcasterStats {
			channel_count: self.channel_count().await,
			total_receivers: self.total_receiver_count().await,
			total_events_sent: self.total_events_sent(),
			total_subscriptions: self.total_subscriptions(),
		}
	}

	/// Drops channels with no active receivers. Returns how many were removed.
	pub async fn cleanup_empty_channels(&self) -> usize {
		let mut channels = self.channels.write().await;
		let initial_count = channels.len();

		channels.retain(|channel, state| {
			let keep = state.sender.receiver_count() > 0;
			if !keep {
				debug!(channel = %channel, "removing empty activity channel");
			}
			keep
		});

		let removed = initial_count - channels.len();
		if removed > 0 {
			info!(removed_channels = removed, "cleaned up empty activity channels");
		}
		removed
	}
}

impl Default for ActivityBroadcaster {
	fn default() -> Self {
		Self::with_defaults()
	}
}

#[async_trait]
impl ActivitySource for ActivityBroadcaster {
	async fn subscribe(&self, channel: ActivityChannel) -> BoxStream<'static, ActivityEvent> {
		let receiver = self.subscribe_receiver(channel).await;
		BroadcastStream::new(receiver)
			.filter_map(move |item| async move {
				match item {
					Ok(event) => Some(event),
					Err(BroadcastStreamRecvError::Lagged(skipped)) => {
						warn!(channel = %channel, skipped, "activity subscriber lagged, events dropped");
						None
					}
				}
			})
			.boxed()
	}
}
