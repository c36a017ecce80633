use iqr_domain::{DescriptorRef, distance};
use iqr_service::NearestNeighborsIndex;

/// Exhaustive Euclidean search over an in-memory collection.
#[derive(Debug, Default)]
pub struct LinearIndex {
	descriptors: Vec<DescriptorRef>,
}
impl LinearIndex {
	pub fn new(descriptors: Vec<DescriptorRef>) -> Self {
		Self { descriptors }
	}
}
impl NearestNeighborsIndex for LinearIndex {
	fn nn(
		&self,
		descriptor: &DescriptorRef,
		count: usize,
	) -> color_eyre::Result<(Vec<DescriptorRef>, Vec<f32>)> {
		let mut scored: Vec<(&DescriptorRef, f32)> = self
			.descriptors
			.iter()
			.filter_map(|candidate| {
				distance::euclidean_distance(descriptor.vector(), candidate.vector())
					.map(|value| (candidate, value))
			})
			.collect();

		scored.sort_by(|lhs, rhs| lhs.1.total_cmp(&rhs.1));
		scored.truncate(count);

		Ok(scored.into_iter().map(|(candidate, value)| (candidate.clone(), value)).unzip())
	}
}
