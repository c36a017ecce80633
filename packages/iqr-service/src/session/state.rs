use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use iqr_domain::{DescriptorFactory, DescriptorRef, DescriptorUid};

use crate::{Error, Result};

const SCHEMA_VERSION: u32 = 2;

pub(super) struct AdjudicationSets<'a> {
	pub(super) positive: &'a IndexSet<DescriptorRef>,
	pub(super) negative: &'a IndexSet<DescriptorRef>,
	pub(super) external_positive: &'a IndexSet<DescriptorRef>,
	pub(super) external_negative: &'a IndexSet<DescriptorRef>,
}

pub(super) struct DecodedState {
	pub(super) positive: IndexSet<DescriptorRef>,
	pub(super) negative: IndexSet<DescriptorRef>,
	pub(super) external_positive: IndexSet<DescriptorRef>,
	pub(super) external_negative: IndexSet<DescriptorRef>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredState {
	schema_version: u32,
	positive: Vec<StoredDescriptor>,
	negative: Vec<StoredDescriptor>,
	external_positive: Vec<StoredDescriptor>,
	external_negative: Vec<StoredDescriptor>,
}

/// Vector components are stored as raw `f32` bit patterns so NaN, infinities, and signed zero
/// survive the JSON round trip unchanged.
#[derive(Debug, Serialize, Deserialize)]
struct StoredDescriptor {
	uid: DescriptorUid,
	vector_bits: Vec<u32>,
}

pub(super) fn encode(sets: AdjudicationSets<'_>) -> Result<Vec<u8>> {
	let stored = StoredState {
		schema_version: SCHEMA_VERSION,
		positive: store_all(sets.positive),
		negative: store_all(sets.negative),
		external_positive: store_all(sets.external_positive),
		external_negative: store_all(sets.external_negative),
	};

	serde_json::to_vec(&stored)
		.map_err(|err| Error::InvalidState { message: format!("Failed to encode state: {err}.") })
}

pub(super) fn decode(bytes: &[u8], factory: &dyn DescriptorFactory) -> Result<DecodedState> {
	let stored: StoredState = serde_json::from_slice(bytes)
		.map_err(|err| Error::InvalidState { message: format!("Failed to decode state: {err}.") })?;

	if stored.schema_version != SCHEMA_VERSION {
		return Err(Error::InvalidState {
			message: format!(
				"Unsupported state schema version {}; expected {SCHEMA_VERSION}.",
				stored.schema_version
			),
		});
	}

	let decoded = DecodedState {
		positive: load_all(stored.positive, factory),
		negative: load_all(stored.negative, factory),
		external_positive: load_all(stored.external_positive, factory),
		external_negative: load_all(stored.external_negative, factory),
	};

	if let Some(overlap) = decoded.positive.intersection(&decoded.negative).next() {
		return Err(Error::InvalidState {
			message: format!("Descriptor {} is both positive and negative.", overlap.uid()),
		});
	}

	Ok(decoded)
}

fn store_all(descriptors: &IndexSet<DescriptorRef>) -> Vec<StoredDescriptor> {
	descriptors
		.iter()
		.map(|descriptor| StoredDescriptor {
			uid: descriptor.uid().clone(),
			vector_bits: descriptor.vector().iter().map(|value| value.to_bits()).collect(),
		})
		.collect()
}

fn load_all(stored: Vec<StoredDescriptor>, factory: &dyn DescriptorFactory) -> IndexSet<DescriptorRef> {
	stored
		.into_iter()
		.map(|entry| {
			let vector = entry.vector_bits.into_iter().map(f32::from_bits).collect();

			factory.create(entry.uid, vector)
		})
		.collect()
}
