use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub session: Session,
	#[serde(default)]
	pub controller: Controller,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Session {
	/// Neighbors requested from the index for every positive descriptor when the working set is
	/// grown.
	#[serde(default = "default_pos_seed_neighbors")]
	pub pos_seed_neighbors: u32,
	#[serde(default)]
	pub auto_negative: AutoNegative,
}

/// Rule used to pick a stand-in negative when a refine has no negative examples.
///
/// Every candidate is scored by its distance to the positive examples and the candidate with the
/// largest score wins. Ties go to the candidate that comes first in the working set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoNegative {
	/// Score is the distance to the nearest positive.
	#[default]
	MaxMinDistance,
	/// Score is the mean distance to all positives.
	MaxMeanDistance,
}

#[derive(Debug, Deserialize)]
pub struct Controller {
	#[serde(default)]
	pub expire_enabled: bool,
	#[serde(default = "default_expire_check_seconds")]
	pub expire_check_seconds: f64,
	/// Zero disables expiration for sessions registered with the default timeout.
	#[serde(default)]
	pub session_timeout_seconds: f64,
}

impl Default for Session {
	fn default() -> Self {
		Self { pos_seed_neighbors: default_pos_seed_neighbors(), auto_negative: AutoNegative::default() }
	}
}

impl Default for Controller {
	fn default() -> Self {
		Self {
			expire_enabled: false,
			expire_check_seconds: default_expire_check_seconds(),
			session_timeout_seconds: 0.0,
		}
	}
}

fn default_pos_seed_neighbors() -> u32 {
	500
}

fn default_expire_check_seconds() -> f64 {
	30.0
}
