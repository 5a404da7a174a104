// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Comment queries, mutations and live subscriptions.
//!
//! Every operation authorizes before it touches the [`CommentStore`], and
//! every mutation publishes only after the store call succeeded. Publishers
//! are trusted; subscribers are re-authorized per event by the gate.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::BoxStream;
use serde_json::{json, Value};
use skein_server_auth::{AuthContext, Authorizer, AuthzError, CommentId, StreamId, StreamRole, UserId};
use tokio::sync::watch;
use tracing::{debug, instrument};

use crate::broadcaster::ActivityBroadcaster;
use crate::error::{ActivityError, Result};
use crate::event::{ActivityChannel, ActivityEvent, ActivityEventType, SubscriptionFilter};
use crate::gate::{live_reauthorizer, EventGate};
use crate::store::{Comment, CommentInput, CommentPage, CommentStore, CommentsQuery, PageRequest, ReplyInput};

/// Role needed to comment on, reply to, view or subscribe to a stream.
pub const COMMENTER_ROLE: StreamRole = StreamRole::Reviewer;

#[derive(Clone)]
pub struct CommentActivityService {
	authorizer: Authorizer,
	store: Arc<dyn CommentStore>,
	broadcaster: Arc<ActivityBroadcaster>,
	gate: EventGate,
}

impl CommentActivityService {
	pub fn new(
		authorizer: Authorizer,
		store: Arc<dyn CommentStore>,
		broadcaster: Arc<ActivityBroadcaster>,
	) -> Self {
		let gate = EventGate::new(broadcaster.clone());
		Self {
			authorizer,
			store,
			broadcaster,
			gate,
		}
	}

	/// Fetches one comment, which must belong to `stream_id`.
	#[instrument(level = "debug", skip_all, fields(stream_id = %stream_id, comment_id = %comment_id))]
	pub async fn comment(
		&self,
		ctx: &AuthContext,
		stream_id: StreamId,
		comment_id: CommentId,
	) -> Result<Comment> {
		self
			.authorizer
			.authorize_stream_access_context(ctx, stream_id)
			.await?;

		self.comment_in_stream(stream_id, comment_id, ctx.user_id).await
	}

	#[instrument(level = "debug", skip_all, fields(stream_id = %query.stream_id))]
	pub async fn comments(&self, ctx: &AuthContext, mut query: CommentsQuery) -> Result<CommentPage> {
		self
			.authorizer
			.authorize_stream_access_context(ctx, query.stream_id)
			.await?;

		query.user_id = ctx.user_id;
		self.store.get_comments(&query).await
	}

	/// Replies to a comment. Only reachable through a comment the caller was
	/// already allowed to read, so no check runs here.
	pub async fn replies(&self, parent: CommentId, page: &PageRequest) -> Result<CommentPage> {
		self.store.get_replies(parent, page).await
	}

	/// Relays ephemeral viewer presence. Nothing is persisted.
	#[instrument(level = "debug", skip_all, fields(stream_id = %stream_id))]
	pub async fn broadcast_viewer_activity(
		&self,
		ctx: &AuthContext,
		stream_id: StreamId,
		resource_id: Option<String>,
		data: Value,
	) -> Result<()> {
		self
			.authorizer
			.authorize_stream_access_context(ctx, stream_id)
			.await?;

		self
			.broadcaster
			.publish(ActivityEvent::viewer_activity(stream_id, resource_id, data))
			.await;
		Ok(())
	}

	#[instrument(level = "debug", skip_all, fields(stream_id = %input.stream_id))]
	pub async fn create_comment(&self, ctx: &AuthContext, input: CommentInput) -> Result<CommentId> {
		let author = self.authorize_commenter(ctx, input.stream_id).await?;
		let id = self.store.create_comment(author, &input).await?;

		let now = Utc::now();
		let mut payload = to_payload(&input)?;
		extend(
			&mut payload,
			json!({
				"id": id,
				"authorId": author,
				"replies": { "totalCount": 0 },
				"createdAt": now,
				"updatedAt": now,
				"eventType": ActivityEventType::CommentAdded,
			}),
		);

		let resource_id = input.correlation_resource().map(|r| r.resource_id.clone());
		self
			.broadcaster
			.publish(ActivityEvent::comment_activity(input.stream_id, resource_id, payload))
			.await;
		Ok(id)
	}

	/// Marks a comment viewed by the caller.
	#[instrument(level = "debug", skip_all, fields(stream_id = %stream_id, comment_id = %comment_id))]
	pub async fn view_comment(
		&self,
		ctx: &AuthContext,
		stream_id: StreamId,
		comment_id: CommentId,
	) -> Result<()> {
		let viewer = self.authorize_commenter(ctx, stream_id).await?;
		self.comment_in_stream(stream_id, comment_id, Some(viewer)).await?;
		self.store.view_comment(viewer, comment_id).await
	}

	#[instrument(level = "debug", skip_all, fields(stream_id = %stream_id, comment_id = %comment_id))]
	pub async fn archive_comment(
		&self,
		ctx: &AuthContext,
		stream_id: StreamId,
		comment_id: CommentId,
		archived: bool,
	) -> Result<()> {
		self
			.authorizer
			.authorize_stream_access_context(ctx, stream_id)
			.await?;

		self
			.store
			.archive_comment(stream_id, comment_id, archived)
			.await?;

		let event_type = if archived {
			ActivityEventType::CommentArchived
		} else {
			ActivityEventType::CommentAdded
		};
		self
			.broadcaster
			.publish(ActivityEvent::thread_activity(
				stream_id,
				comment_id,
				event_type,
				json!({ "eventType": event_type }),
			))
			.await;
		Ok(())
	}

	#[instrument(level = "debug", skip_all, fields(stream_id = %input.stream_id, parent = %input.parent_comment))]
	pub async fn reply(&self, ctx: &AuthContext, input: ReplyInput) -> Result<CommentId> {
		let author = self.authorize_commenter(ctx, input.stream_id).await?;
		self
			.comment_in_stream(input.stream_id, input.parent_comment, Some(author))
			.await?;
		let id = self.store.create_reply(author, &input).await?;

		let now = Utc::now();
		let mut payload = to_payload(&input)?;
		extend(
			&mut payload,
			json!({
				"id": id,
				"authorId": author,
				"createdAt": now,
				"updatedAt": now,
				"eventType": ActivityEventType::ReplyAdded,
			}),
		);

		self
			.broadcaster
			.publish(ActivityEvent::thread_activity(
				input.stream_id,
				input.parent_comment,
				ActivityEventType::ReplyAdded,
				payload,
			))
			.await;
		Ok(id)
	}

	pub async fn subscribe_viewer_activity(
		&self,
		credentials: watch::Receiver<AuthContext>,
		filter: SubscriptionFilter,
	) -> BoxStream<'static, ActivityEvent> {
		self
			.subscribe(ActivityChannel::ViewerActivity, credentials, filter)
			.await
	}

	pub async fn subscribe_comment_activity(
		&self,
		credentials: watch::Receiver<AuthContext>,
		filter: SubscriptionFilter,
	) -> BoxStream<'static, ActivityEvent> {
		self
			.subscribe(ActivityChannel::CommentActivity, credentials, filter)
			.await
	}

	pub async fn subscribe_comment_thread_activity(
		&self,
		credentials: watch::Receiver<AuthContext>,
		filter: SubscriptionFilter,
	) -> BoxStream<'static, ActivityEvent> {
		self
			.subscribe(ActivityChannel::CommentThreadActivity, credentials, filter)
			.await
	}

	async fn subscribe(
		&self,
		channel: ActivityChannel,
		credentials: watch::Receiver<AuthContext>,
		filter: SubscriptionFilter,
	) -> BoxStream<'static, ActivityEvent> {
		let reauthorize = live_reauthorizer(self.authorizer.clone(), credentials, COMMENTER_ROLE);
		self.gate.subscribe(channel, filter, reauthorize).await
	}

	/// Loads a comment that must belong to `stream_id`, the stream the caller
	/// was authorized against.
	async fn comment_in_stream(
		&self,
		stream_id: StreamId,
		comment_id: CommentId,
		viewer: Option<UserId>,
	) -> Result<Comment> {
		let comment = self
			.store
			.get_comment(comment_id, viewer)
			.await?
			.ok_or(ActivityError::CommentNotFound(comment_id))?;

		if comment.stream_id != stream_id {
			debug!(
				stream_id = %stream_id,
				actual_stream_id = %comment.stream_id,
				"comment addressed through another stream"
			);
			return Err(ActivityError::CommentStreamMismatch);
		}
		Ok(comment)
	}

	/// Requires [`COMMENTER_ROLE`] and returns the acting user.
	async fn authorize_commenter(&self, ctx: &AuthContext, stream_id: StreamId) -> Result<UserId> {
		self
			.authorizer
			.authorize_context(ctx, stream_id, COMMENTER_ROLE)
			.await?;
		ctx
			.user_id
			.ok_or_else(|| AuthzError::Forbidden("You are not authorized.".to_string()).into())
	}
}

fn to_payload<T: serde::Serialize>(value: &T) -> Result<Value> {
	serde_json::to_value(value).map_err(|e| ActivityError::Store(e.to_string()))
}

fn extend(payload: &mut Value, fields: Value) {
	if let (Value::Object(target), Value::Object(fields)) = (payload, fields) {
		target.extend(fields);
	}
}
