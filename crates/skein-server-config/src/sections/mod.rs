// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod activity;
mod authz;
mod logging;

pub use activity::{ActivityConfig, ActivityConfigLayer};
pub use authz::{AuthzConfig, AuthzConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
