// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Live comment activity for skein streams.
//!
//! Mutations publish [`ActivityEvent`]s on an [`ActivityBroadcaster`] after
//! their own authorization passed. Subscriptions receive events through an
//! [`EventGate`], which re-runs the stream authorization for every event using
//! the connection's current credentials and drops anything outside the
//! subscriber's [`SubscriptionFilter`].

pub mod broadcaster;
pub mod error;
pub mod event;
pub mod gate;
pub mod memory;
pub mod service;
pub mod store;

pub use broadcaster::{ActivityBroadcaster, ActivitySource, BroadcasterStats, ChannelStats};
pub use error::{ActivityError, Result};
pub use event::{ActivityChannel, ActivityEvent, ActivityEventType, SubscriptionFilter};
pub use gate::{gate_events, live_reauthorizer, EventGate};
pub use memory::InMemoryCommentStore;
pub use service::{CommentActivityService, COMMENTER_ROLE};
pub use store::{
	Comment, CommentInput, CommentPage, CommentStore, CommentsQuery, PageRequest, ReplyInput,
	ResourceRef, ResourceType, DEFAULT_PAGE_SIZE,
};
