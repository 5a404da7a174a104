// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory [`CommentStore`].

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skein_server_auth::{CommentId, StreamId, UserId};

use crate::error::{ActivityError, Result};
use crate::store::{
	Comment, CommentInput, CommentPage, CommentStore, CommentsQuery, PageRequest, ReplyInput,
	ResourceRef, ResourceType,
};

#[derive(Debug, Default)]
struct Inner {
	/// Insertion order; pagination cursors index into it.
	order: Vec<CommentId>,
	comments: HashMap<CommentId, Comment>,
	views: HashMap<(UserId, CommentId), DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct InMemoryCommentStore {
	inner: RwLock<Inner>,
}

impl InMemoryCommentStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.inner.read().unwrap_or_else(|e| e.into_inner()).order.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn insert(&self, comment: Comment) -> CommentId {
		let id = comment.id;
		let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
		inner.order.push(id);
		inner.comments.insert(id, comment);
		id
	}

	fn page<F>(&self, viewer: Option<UserId>, page: &PageRequest, keep: F) -> Result<CommentPage>
	where
		F: Fn(&Comment) -> bool,
	{
		let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
		let matching: Vec<&Comment> = inner
			.order
			.iter()
			.filter_map(|id| inner.comments.get(id))
			.filter(|c| keep(*c))
			.collect();

		let start = match &page.cursor {
			Some(cursor) => {
				let after: CommentId = cursor
					.parse()
					.map_err(|_| ActivityError::Store(format!("invalid cursor '{cursor}'")))?;
				matching
					.iter()
					.position(|c| c.id == after)
					.map_or(matching.len(), |i| i + 1)
			}
			None => 0,
		};

		let items: Vec<Comment> = matching
			.iter()
			.skip(start)
			.take(page.limit())
			.map(|c| with_view(c, viewer, &inner.views))
			.collect();
		let cursor = if start + items.len() < matching.len() {
			items.last().map(|c| c.id.to_string())
		} else {
			None
		};

		Ok(CommentPage {
			total_count: matching.len(),
			cursor,
			items,
		})
	}
}

fn with_view(
	comment: &Comment,
	viewer: Option<UserId>,
	views: &HashMap<(UserId, CommentId), DateTime<Utc>>,
) -> Comment {
	let mut comment = comment.clone();
	comment.viewed_at = viewer.and_then(|user| views.get(&(user, comment.id)).copied());
	comment
}

fn attached_to_any(comment: &Comment, resources: &[ResourceRef]) -> bool {
	resources.is_empty() || comment.resources.iter().any(|r| resources.contains(r))
}

#[async_trait]
impl CommentStore for InMemoryCommentStore {
	async fn get_comment(&self, id: CommentId, viewer: Option<UserId>) -> Result<Option<Comment>> {
		let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
		Ok(inner.comments.get(&id).map(|c| with_view(c, viewer, &inner.views)))
	}

	async fn get_comments(&self, query: &CommentsQuery) -> Result<CommentPage> {
		self.page(query.user_id, &query.page, |c| {
			c.stream_id == query.stream_id
				&& c.parent_comment.is_none()
				&& c.archived == query.archived
				&& attached_to_any(c, &query.resources)
		})
	}

	async fn get_replies(&self, parent: CommentId, page: &PageRequest) -> Result<CommentPage> {
		self.page(None, page, |c| c.parent_comment == Some(parent))
	}

	async fn create_comment(&self, author: UserId, input: &CommentInput) -> Result<CommentId> {
		let now = Utc::now();
		Ok(self.insert(Comment {
			id: CommentId::generate(),
			stream_id: input.stream_id,
			author_id: author,
			text: input.text.clone(),
			data: input.data.clone(),
			resources: input.resources.clone(),
			parent_comment: None,
			archived: false,
			viewed_at: None,
			created_at: now,
			updated_at: now,
		}))
	}

	async fn create_reply(&self, author: UserId, input: &ReplyInput) -> Result<CommentId> {
		let parent_stream = self
			.inner
			.read()
			.unwrap_or_else(|e| e.into_inner())
			.comments
			.get(&input.parent_comment)
			.map(|c| c.stream_id);
		match parent_stream {
			None => return Err(ActivityError::CommentNotFound(input.parent_comment)),
			Some(stream_id) if stream_id != input.stream_id => {
				return Err(ActivityError::CommentStreamMismatch)
			}
			Some(_) => {}
		}

		let now = Utc::now();
		Ok(self.insert(Comment {
			id: CommentId::generate(),
			stream_id: input.stream_id,
			author_id: author,
			text: input.text.clone(),
			data: input.data.clone(),
			resources: vec![ResourceRef::new(
				ResourceType::Comment,
				input.parent_comment.to_string(),
			)],
			parent_comment: Some(input.parent_comment),
			archived: false,
			viewed_at: None,
			created_at: now,
			updated_at: now,
		}))
	}

	async fn view_comment(&self, user_id: UserId, comment_id: CommentId) -> Result<()> {
		let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
		if !inner.comments.contains_key(&comment_id) {
			return Err(ActivityError::CommentNotFound(comment_id));
		}
		inner.views.insert((user_id, comment_id), Utc::now());
		Ok(())
	}

	async fn archive_comment(
		&self,
		stream_id: StreamId,
		comment_id: CommentId,
		archived: bool,
	) -> Result<()> {
		let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
		match inner.comments.get_mut(&comment_id) {
			Some(comment) if comment.stream_id == stream_id => {
				comment.archived = archived;
				comment.updated_at = Utc::now();
				Ok(())
			}
			Some(_) => Err(ActivityError::CommentStreamMismatch),
			None => Err(ActivityError::CommentNotFound(comment_id)),
		}
	}
}
