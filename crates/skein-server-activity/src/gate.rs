// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-event re-authorization of live subscriptions.
//!
//! ```text
//! source.subscribe(channel)
//!        │
//!        ▼
//!   filter.matches(event)? ──no──> skip
//!        │ yes
//!        ▼
//!   reauthorize(event.stream_id) ──Err(terminal)──> end of stream
//!        │ Ok                    └─Err(other)────> skip
//!        ▼
//!     deliver
//! ```
//!
//! The reauthorize callback runs against the credentials the connection holds
//! when the event arrives, so revoking a role stops delivery on the next
//! event. Each subscription owns its own gate; one subscriber's slow or
//! failing check never touches another's.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use skein_server_auth::{AuthContext, Authorizer, AuthzError, StreamId, StreamRole};
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use crate::broadcaster::ActivitySource;
use crate::event::{ActivityChannel, ActivityEvent, SubscriptionFilter};

/// Gates `events` through `filter` and `reauthorize`.
///
/// The correlation filter runs first so unrelated events cost no lookup. A
/// terminal authorization error ends the stream; any other error silently
/// drops that one event.
pub fn gate_events<S, F, Fut>(
	events: S,
	filter: SubscriptionFilter,
	reauthorize: F,
) -> impl Stream<Item = ActivityEvent>
where
	S: Stream<Item = ActivityEvent> + Unpin,
	F: FnMut(StreamId) -> Fut,
	Fut: Future<Output = Result<(), AuthzError>>,
{
	stream::unfold(
		(events, filter, reauthorize),
		|(mut events, filter, mut reauthorize)| async move {
			while let Some(event) = events.next().await {
				if !filter.matches(&event) {
					trace!(channel = %event.channel, "event outside subscription filter");
					continue;
				}

				match reauthorize(event.stream_id).await {
					Ok(()) => return Some((event, (events, filter, reauthorize))),
					Err(e) if e.is_terminal() => {
						warn!(
							stream_id = %event.stream_id,
							error = %e,
							"subscription ended by terminal authorization failure"
						);
						return None;
					}
					Err(e) => {
						debug!(
							stream_id = %event.stream_id,
							error = %e,
							"event withheld from subscriber"
						);
					}
				}
			}
			None
		},
	)
}

/// Opens gated subscriptions on an [`ActivitySource`].
#[derive(Clone)]
pub struct EventGate {
	source: Arc<dyn ActivitySource>,
}

impl EventGate {
	pub fn new(source: Arc<dyn ActivitySource>) -> Self {
		Self { source }
	}

	/// Subscribes to `channel` and yields only the events that match `filter`
	/// and pass `reauthorize` at delivery time.
	///
	/// The returned stream never ends on its own unless the source closes or
	/// a terminal authorization error occurs. Dropping it unsubscribes.
	pub async fn subscribe<F, Fut>(
		&self,
		channel: ActivityChannel,
		filter: SubscriptionFilter,
		reauthorize: F,
	) -> BoxStream<'static, ActivityEvent>
	where
		F: FnMut(StreamId) -> Fut + Send + 'static,
		Fut: Future<Output = Result<(), AuthzError>> + Send + 'static,
	{
		debug!(channel = %channel, stream_id = %filter.stream_id, "opening gated subscription");
		let events = self.source.subscribe(channel).await;
		gate_events(events, filter, reauthorize).boxed()
	}
}

/// A reauthorize callback that checks `role` for whoever `credentials` names
/// at the moment each event arrives.
///
/// An unauthenticated context is checked as no actor at all.
pub fn live_reauthorizer(
	authorizer: Authorizer,
	credentials: watch::Receiver<AuthContext>,
	role: StreamRole,
) -> impl FnMut(StreamId) -> BoxFuture<'static, Result<(), AuthzError>> + Send + 'static {
	move |stream_id| {
		let actor = {
			let ctx = credentials.borrow();
			if ctx.auth {
				ctx.user_id
			} else {
				None
			}
		};
		let authorizer = authorizer.clone();
		Box::pin(async move {
			authorizer
				.authorize_role(actor, stream_id, role)
				.await
				.map(|_| ())
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::broadcaster::ActivityBroadcaster;
	use serde_json::json;
	use skein_server_auth::{InMemoryDirectory, ServerRole, StaticOverridePolicy, UserId};
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::time::Duration;
	use tokio::time::timeout;

	fn comment(stream_id: StreamId, n: u32) -> ActivityEvent {
		ActivityEvent::comment_activity(stream_id, Some("obj".into()), json!({ "n": n }))
	}

	async fn collect(
		events: Vec<ActivityEvent>,
		filter: SubscriptionFilter,
		verdicts: Vec<Result<(), AuthzError>>,
	) -> Vec<ActivityEvent> {
		let mut verdicts = verdicts.into_iter();
		gate_events(stream::iter(events), filter, move |_| {
			let verdict = verdicts.next().unwrap_or(Ok(()));
			async move { verdict }
		})
		.collect()
		.await
	}

	mod filtering {
		use super::*;

		#[tokio::test]
		async fn filter_runs_before_reauthorize() {
			let s1 = StreamId::generate();
			let s2 = StreamId::generate();
			let calls = Arc::new(AtomicUsize::new(0));
			let counter = calls.clone();

			let delivered: Vec<_> = gate_events(
				stream::iter(vec![comment(s2, 0), comment(s1, 1)]),
				SubscriptionFilter::for_resource(s1, Some("obj".into())),
				move |_| {
					counter.fetch_add(1, Ordering::SeqCst);
					async { Ok(()) }
				},
			)
			.collect()
			.await;

			assert_eq!(delivered.len(), 1);
			assert_eq!(delivered[0].stream_id, s1);
			assert_eq!(calls.load(Ordering::SeqCst), 1);
		}
	}

	mod verdicts {
		use super::*;

		#[tokio::test]
		async fn denied_events_are_skipped_not_fatal() {
			let s = StreamId::generate();
			let delivered = collect(
				vec![comment(s, 0), comment(s, 1), comment(s, 2)],
				SubscriptionFilter::for_resource(s, Some("obj".into())),
				vec![Ok(()), Err(AuthzError::Forbidden("no".into())), Ok(())],
			)
			.await;

			let ns: Vec<_> = delivered.iter().map(|e| e.payload["n"].clone()).collect();
			assert_eq!(ns, vec![json!(0), json!(2)]);
		}

		#[tokio::test]
		async fn unavailable_directory_skips_the_event() {
			let s = StreamId::generate();
			let delivered = collect(
				vec![comment(s, 0), comment(s, 1)],
				SubscriptionFilter::for_resource(s, Some("obj".into())),
				vec![Err(AuthzError::Directory("down".into())), Ok(())],
			)
			.await;
			assert_eq!(delivered.len(), 1);
		}

		#[tokio::test]
		async fn terminal_error_ends_the_stream() {
			let s = StreamId::generate();
			let delivered = collect(
				vec![comment(s, 0), comment(s, 1), comment(s, 2)],
				SubscriptionFilter::for_resource(s, Some("obj".into())),
				vec![Ok(()), Err(AuthzError::ActorNotFound(UserId::generate())), Ok(())],
			)
			.await;
			assert_eq!(delivered.len(), 1);
		}
	}

	mod live {
		use super::*;

		#[tokio::test]
		async fn reauthorizer_follows_credential_changes() {
			let directory = Arc::new(InMemoryDirectory::new());
			let owner = directory.add_user(ServerRole::User);
			let stream_id = directory.add_stream(owner, false);
			let authorizer = Authorizer::new(directory, Arc::new(StaticOverridePolicy(false)));

			let ctx = AuthContext::authenticated(owner, Some("server:user".into()), Default::default());
			let (tx, rx) = watch::channel(ctx);
			let mut check = live_reauthorizer(authorizer, rx, StreamRole::Reviewer);

			assert_eq!(check(stream_id).await, Ok(()));
			tx.send_replace(AuthContext::anonymous());
			assert!(matches!(check(stream_id).await, Err(AuthzError::Forbidden(_))));
		}

		#[tokio::test]
		async fn gate_over_broadcaster_delivers_authorized_events() {
			let broadcaster = Arc::new(ActivityBroadcaster::with_defaults());
			let gate = EventGate::new(broadcaster.clone());
			let s = StreamId::generate();

			let mut events = gate
				.subscribe(
					ActivityChannel::CommentActivity,
					SubscriptionFilter::for_resource(s, Some("obj".into())),
					|_| async { Ok(()) },
				)
				.await;

			broadcaster.publish(comment(StreamId::generate(), 0)).await;
			broadcaster.publish(comment(s, 1)).await;

			let got = timeout(Duration::from_millis(100), events.next())
				.await
				.unwrap()
				.unwrap();
			assert_eq!(got.payload, json!({ "n": 1 }));
		}
	}
}
