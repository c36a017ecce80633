/// Euclidean distance, or `None` when the vectors have different dimensions.
pub fn euclidean_distance(lhs: &[f32], rhs: &[f32]) -> Option<f32> {
	if lhs.len() != rhs.len() {
		return None;
	}

	let sum: f32 = lhs
		.iter()
		.zip(rhs.iter())
		.map(|(l, r)| {
			let diff = l - r;

			diff * diff
		})
		.sum();

	Some(sum.sqrt())
}

/// Distance from `candidate` to the closest anchor. Anchors with mismatched dimensions are
/// skipped.
pub fn nearest_distance<'a, I>(candidate: &[f32], anchors: I) -> Option<f32>
where
	I: IntoIterator<Item = &'a [f32]>,
{
	let mut best: Option<f32> = None;

	for anchor in anchors {
		let Some(distance) = euclidean_distance(candidate, anchor) else {
			continue;
		};

		if best.map(|value| distance < value).unwrap_or(true) {
			best = Some(distance);
		}
	}

	best
}

/// Mean distance from `candidate` to the anchors. Anchors with mismatched dimensions are
/// skipped.
pub fn mean_distance<'a, I>(candidate: &[f32], anchors: I) -> Option<f32>
where
	I: IntoIterator<Item = &'a [f32]>,
{
	let mut total = 0.0_f32;
	let mut count = 0_usize;

	for anchor in anchors {
		let Some(distance) = euclidean_distance(candidate, anchor) else {
			continue;
		};

		total += distance;
		count += 1;
	}

	if count == 0 {
		return None;
	}

	Some(total / count as f32)
}

/// Element-wise mean of the given vectors, or `None` when they are empty or disagree on
/// dimensions.
pub fn centroid<'a, I>(vectors: I) -> Option<Vec<f32>>
where
	I: IntoIterator<Item = &'a [f32]>,
{
	let mut sum: Option<Vec<f32>> = None;
	let mut count = 0_usize;

	for vector in vectors {
		match sum.as_mut() {
			None => sum = Some(vector.to_vec()),
			Some(acc) => {
				if acc.len() != vector.len() {
					return None;
				}

				for (slot, value) in acc.iter_mut().zip(vector.iter()) {
					*slot += value;
				}
			},
		}

		count += 1;
	}

	let mut sum = sum?;

	for slot in &mut sum {
		*slot /= count as f32;
	}

	Some(sum)
}
