// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Activity events and the correlation filters subscriptions use to select
//! them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skein_server_auth::{CommentId, StreamId};

/// Named pub/sub channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityChannel {
	CommentActivity,
	ViewerActivity,
	CommentThreadActivity,
}

impl ActivityChannel {
	pub fn all() -> &'static [ActivityChannel] {
		&[
			ActivityChannel::CommentActivity,
			ActivityChannel::ViewerActivity,
			ActivityChannel::CommentThreadActivity,
		]
	}

	pub const fn as_str(&self) -> &'static str {
		match self {
			ActivityChannel::CommentActivity => "COMMENT_ACTIVITY",
			ActivityChannel::ViewerActivity => "VIEWER_ACTIVITY",
			ActivityChannel::CommentThreadActivity => "COMMENT_THREAD_ACTIVITY",
		}
	}
}

impl fmt::Display for ActivityChannel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityEventType {
	CommentAdded,
	CommentArchived,
	ReplyAdded,
	ViewerActivity,
}

impl ActivityEventType {
	pub const fn as_str(&self) -> &'static str {
		match self {
			ActivityEventType::CommentAdded => "comment-added",
			ActivityEventType::CommentArchived => "comment-archived",
			ActivityEventType::ReplyAdded => "reply-added",
			ActivityEventType::ViewerActivity => "viewer-activity",
		}
	}
}

impl fmt::Display for ActivityEventType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One published event.
///
/// `stream_id` plus either `resource_id` or `comment_id` are the correlation
/// fields; `payload` carries the domain data and is opaque to the gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
	pub channel: ActivityChannel,
	pub stream_id: StreamId,
	pub resource_id: Option<String>,
	pub comment_id: Option<CommentId>,
	pub event_type: ActivityEventType,
	pub payload: serde_json::Value,
	pub created_at: DateTime<Utc>,
}

impl ActivityEvent {
	pub fn comment_activity(
		stream_id: StreamId,
		resource_id: Option<String>,
		payload: serde_json::Value,
	) -> Self {
		Self {
			channel: ActivityChannel::CommentActivity,
			stream_id,
			resource_id,
			comment_id: None,
			event_type: ActivityEventType::CommentAdded,
			payload,
			created_at: Utc::now(),
		}
	}

	pub fn viewer_activity(
		stream_id: StreamId,
		resource_id: Option<String>,
		payload: serde_json::Value,
	) -> Self {
		Self {
			channel: ActivityChannel::ViewerActivity,
			stream_id,
			resource_id,
			comment_id: None,
			event_type: ActivityEventType::ViewerActivity,
			payload,
			created_at: Utc::now(),
		}
	}

	pub fn thread_activity(
		stream_id: StreamId,
		comment_id: CommentId,
		event_type: ActivityEventType,
		payload: serde_json::Value,
	) -> Self {
		Self {
			channel: ActivityChannel::CommentThreadActivity,
			stream_id,
			resource_id: None,
			comment_id: Some(comment_id),
			event_type,
			payload,
			created_at: Utc::now(),
		}
	}
}

/// The correlation arguments a subscriber supplied.
///
/// Matching is exact. Thread activity is correlated by comment id; the other
/// channels by resource id, where an absent resource id only matches events
/// that also carry none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFilter {
	pub stream_id: StreamId,
	pub resource_id: Option<String>,
	pub comment_id: Option<CommentId>,
}

impl SubscriptionFilter {
	pub fn for_resource(stream_id: StreamId, resource_id: Option<String>) -> Self {
		Self {
			stream_id,
			resource_id,
			comment_id: None,
		}
	}

	pub fn for_thread(stream_id: StreamId, comment_id: CommentId) -> Self {
		Self {
			stream_id,
			resource_id: None,
			comment_id: Some(comment_id),
		}
	}

	pub fn matches(&self, event: &ActivityEvent) -> bool {
		if event.stream_id != self.stream_id {
			return false;
		}
		match event.channel {
			ActivityChannel::CommentThreadActivity => event.comment_id == self.comment_id,
			ActivityChannel::CommentActivity | ActivityChannel::ViewerActivity => {
				event.resource_id == self.resource_id
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	mod filters {
		use super::*;

		#[test]
		fn other_stream_never_matches() {
			let s1 = StreamId::generate();
			let s2 = StreamId::generate();
			let event = ActivityEvent::comment_activity(s1, Some("obj".into()), json!({}));
			assert!(!SubscriptionFilter::for_resource(s2, Some("obj".into())).matches(&event));
			assert!(SubscriptionFilter::for_resource(s1, Some("obj".into())).matches(&event));
		}

		#[test]
		fn resource_ids_compare_exactly() {
			let stream = StreamId::generate();
			let event = ActivityEvent::viewer_activity(stream, None, json!({}));
			assert!(SubscriptionFilter::for_resource(stream, None).matches(&event));
			assert!(!SubscriptionFilter::for_resource(stream, Some("obj".into())).matches(&event));
		}

		#[test]
		fn thread_events_match_on_comment() {
			let stream = StreamId::generate();
			let comment = CommentId::generate();
			let event = ActivityEvent::thread_activity(
				stream,
				comment,
				ActivityEventType::ReplyAdded,
				json!({}),
			);
			assert!(SubscriptionFilter::for_thread(stream, comment).matches(&event));
			assert!(!SubscriptionFilter::for_thread(stream, CommentId::generate()).matches(&event));
		}
	}

	#[test]
	fn event_types_serialize_kebab_case() {
		assert_eq!(
			serde_json::to_value(ActivityEventType::CommentArchived).unwrap(),
			json!("comment-archived")
		);
		assert_eq!(ActivityChannel::ViewerActivity.to_string(), "VIEWER_ACTIVITY");
	}

	proptest! {
			#[test]
			fn filter_rejects_any_other_stream(resource in proptest::option::of("[a-z0-9]{1,12}")) {
					let published = StreamId::generate();
					let subscribed = StreamId::generate();
					let event = ActivityEvent::comment_activity(published, resource.clone(), json!({}));
					prop_assert!(!SubscriptionFilter::for_resource(subscribed, resource).matches(&event));
			}
	}
}
