use iqr_config::AutoNegative;
use iqr_domain::{DescriptorRef, distance};

/// Picks the candidate least similar to the positives under `strategy`.
///
/// Candidates whose vectors match no positive's dimensions are never selected. Ties keep the
/// earliest candidate.
pub fn select_auto_negative<'a, I>(
	strategy: AutoNegative,
	candidates: I,
	positives: &[&[f32]],
) -> Option<DescriptorRef>
where
	I: IntoIterator<Item = &'a DescriptorRef>,
{
	let mut best: Option<(&DescriptorRef, f32)> = None;

	for candidate in candidates {
		let anchors = positives.iter().copied();
		let score = match strategy {
			AutoNegative::MaxMinDistance => distance::nearest_distance(candidate.vector(), anchors),
			AutoNegative::MaxMeanDistance => distance::mean_distance(candidate.vector(), anchors),
		};
		let Some(score) = score.filter(|value| !value.is_nan()) else { continue };

		if best.map(|(_, value)| score > value).unwrap_or(true) {
			best = Some((candidate, score));
		}
	}

	best.map(|(descriptor, _)| descriptor.clone())
}
