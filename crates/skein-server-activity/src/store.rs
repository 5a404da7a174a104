// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Comment persistence collaborator.
//!
//! The store performs no authorization. [`crate::CommentActivityService`]
//! checks access before every call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skein_server_auth::{CommentId, StreamId, UserId};

use crate::error::Result;

/// Page size used when a query does not set one.
pub const DEFAULT_PAGE_SIZE: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
	Stream,
	Commit,
	Object,
	Comment,
}

/// Something a comment is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
	pub resource_id: String,
	pub resource_type: ResourceType,
}

impl ResourceRef {
	pub fn new(resource_type: ResourceType, resource_id: impl Into<String>) -> Self {
		Self {
			resource_id: resource_id.into(),
			resource_type,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
	pub id: CommentId,
	pub stream_id: StreamId,
	pub author_id: UserId,
	pub text: String,
	pub data: serde_json::Value,
	pub resources: Vec<ResourceRef>,
	pub parent_comment: Option<CommentId>,
	pub archived: bool,
	/// When the requesting user last marked the comment viewed.
	pub viewed_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentInput {
	pub stream_id: StreamId,
	/// Attached resources. The first entry is conventionally the stream itself.
	pub resources: Vec<ResourceRef>,
	pub text: String,
	#[serde(default)]
	pub data: serde_json::Value,
}

impl CommentInput {
	/// The resource used to correlate comment activity: the first attached
	/// resource that is not the stream.
	pub fn correlation_resource(&self) -> Option<&ResourceRef> {
		self
			.resources
			.iter()
			.find(|r| r.resource_type != ResourceType::Stream)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyInput {
	pub stream_id: StreamId,
	pub parent_comment: CommentId,
	pub text: String,
	#[serde(default)]
	pub data: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
	pub limit: Option<usize>,
	pub cursor: Option<String>,
}

impl PageRequest {
	pub fn limit(&self) -> usize {
		self.limit.unwrap_or(DEFAULT_PAGE_SIZE)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentsQuery {
	pub stream_id: StreamId,
	/// Only comments attached to at least one of these; empty means all.
	#[serde(default)]
	pub resources: Vec<ResourceRef>,
	#[serde(default)]
	pub archived: bool,
	#[serde(flatten)]
	pub page: PageRequest,
	/// Viewer whose `viewed_at` is reported.
	#[serde(skip)]
	pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
	pub total_count: usize,
	pub cursor: Option<String>,
	pub items: Vec<Comment>,
}

#[async_trait]
pub trait CommentStore: Send + Sync {
	async fn get_comment(&self, id: CommentId, viewer: Option<UserId>) -> Result<Option<Comment>>;

	/// Top-level comments on a stream.
	async fn get_comments(&self, query: &CommentsQuery) -> Result<CommentPage>;

	async fn get_replies(&self, parent: CommentId, page: &PageRequest) -> Result<CommentPage>;

	async fn create_comment(&self, author: UserId, input: &CommentInput) -> Result<CommentId>;

	async fn create_reply(&self, author: UserId, input: &ReplyInput) -> Result<CommentId>;

	async fn view_comment(&self, user_id: UserId, comment_id: CommentId) -> Result<()>;

	async fn archive_comment(
		&self,
		stream_id: StreamId,
		comment_id: CommentId,
		archived: bool,
	) -> Result<()>;
}
