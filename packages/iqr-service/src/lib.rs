pub mod controller;
pub mod negative;
pub mod session;

mod error;

pub use controller::{
	ControllerSettings, ExpireCallback, IqrController, RegistryGuard, SessionHandle,
};
pub use error::{Error, Result};
pub use iqr_config::AutoNegative;
pub use session::{Adjudication, IqrSession, RelevancyList, SessionInfo, SessionSettings};

use iqr_domain::{DescriptorRef, DescriptorUid};

/// Nearest-neighbor lookup over an indexed descriptor collection.
pub trait NearestNeighborsIndex
where
	Self: Send + Sync,
{
	/// Returns up to `count` neighbors of `descriptor` and their distances, closest first.
	fn nn(
		&self,
		descriptor: &DescriptorRef,
		count: usize,
	) -> color_eyre::Result<(Vec<DescriptorRef>, Vec<f32>)>;
}

/// Relevancy ranking that also proposes the next descriptors to adjudicate.
pub trait RankRelevancyWithFeedback
where
	Self: Send + Sync,
{
	/// Scores every pool entry and returns the scores in pool order together with the feedback
	/// UIDs, which must be drawn from `pool_uids`.
	fn rank_with_feedback(
		&self,
		pos: &[&[f32]],
		neg: &[&[f32]],
		pool: &[&[f32]],
		pool_uids: &[DescriptorUid],
	) -> color_eyre::Result<(Vec<f32>, Vec<DescriptorUid>)>;
}
