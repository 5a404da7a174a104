// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Live activity configuration section.

use serde::{Deserialize, Serialize};

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActivityConfigLayer {
	pub channel_capacity: Option<usize>,
}

impl ActivityConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.channel_capacity.is_some() {
			self.channel_capacity = other.channel_capacity;
		}
	}

	pub fn finalize(self) -> ActivityConfig {
		ActivityConfig {
			channel_capacity: self
				.channel_capacity
				.filter(|c| *c > 0)
				.unwrap_or(DEFAULT_CHANNEL_CAPACITY),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityConfig {
	/// Events buffered per channel before slow subscribers start lagging.
	pub channel_capacity: usize,
}

impl Default for ActivityConfig {
	fn default() -> Self {
		Self {
			channel_capacity: DEFAULT_CHANNEL_CAPACITY,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zero_capacity_falls_back_to_default() {
		let config = ActivityConfigLayer {
			channel_capacity: Some(0),
		}
		.finalize();
		assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
	}
}
