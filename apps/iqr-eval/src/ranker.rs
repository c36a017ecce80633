use color_eyre::eyre;

use iqr_domain::{DescriptorUid, distance};
use iqr_service::RankRelevancyWithFeedback;

/// Scores pool entries by relative closeness to the positive and negative centroids.
///
/// A score of `1.0` sits on the positive centroid, `0.0` on the negative one. Feedback is the
/// `feedback_size` entries closest to `0.5`.
#[derive(Clone, Copy, Debug)]
pub struct CentroidRanker {
	feedback_size: usize,
}
impl CentroidRanker {
	pub fn new(feedback_size: usize) -> Self {
		Self { feedback_size }
	}
}
impl RankRelevancyWithFeedback for CentroidRanker {
	fn rank_with_feedback(
		&self,
		pos: &[&[f32]],
		neg: &[&[f32]],
		pool: &[&[f32]],
		pool_uids: &[DescriptorUid],
	) -> color_eyre::Result<(Vec<f32>, Vec<DescriptorUid>)> {
		let pos_centroid = distance::centroid(pos.iter().copied())
			.ok_or_else(|| eyre::eyre!("Positive examples must share one dimension."))?;
		let neg_centroid = distance::centroid(neg.iter().copied())
			.ok_or_else(|| eyre::eyre!("Negative examples must share one dimension."))?;
		let mut scores = Vec::with_capacity(pool.len());

		for (vector, uid) in pool.iter().zip(pool_uids) {
			let (Some(to_pos), Some(to_neg)) = (
				distance::euclidean_distance(vector, &pos_centroid),
				distance::euclidean_distance(vector, &neg_centroid),
			) else {
				return Err(eyre::eyre!("Descriptor {uid} does not match the example dimension."));
			};
			let total = to_pos + to_neg;

			scores.push(if total > 0.0 { to_neg / total } else { 0.5 });
		}

		let mut order: Vec<usize> = (0..scores.len()).collect();

		order.sort_by(|lhs, rhs| (scores[*lhs] - 0.5).abs().total_cmp(&(scores[*rhs] - 0.5).abs()));

		let feedback =
			order.into_iter().take(self.feedback_size).map(|idx| pool_uids[idx].clone()).collect();

		Ok((scores, feedback))
	}
}
