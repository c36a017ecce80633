use indexmap::{IndexMap, map::Entry};

use crate::descriptor::{DescriptorRef, DescriptorUid};

/// Candidate pool for ranking. Iteration follows insertion order.
#[derive(Clone, Debug, Default)]
pub struct WorkingSet {
	descriptors: IndexMap<DescriptorUid, DescriptorRef>,
}
impl WorkingSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.descriptors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.descriptors.is_empty()
	}

	pub fn contains(&self, uid: &DescriptorUid) -> bool {
		self.descriptors.contains_key(uid)
	}

	pub fn get(&self, uid: &DescriptorUid) -> Option<&DescriptorRef> {
		self.descriptors.get(uid)
	}

	/// Returns `true` when the descriptor was not already present.
	pub fn add(&mut self, descriptor: DescriptorRef) -> bool {
		match self.descriptors.entry(descriptor.uid().clone()) {
			Entry::Occupied(_) => false,
			Entry::Vacant(entry) => {
				entry.insert(descriptor);

				true
			},
		}
	}

	/// Returns how many descriptors were new.
	pub fn add_many<I>(&mut self, descriptors: I) -> usize
	where
		I: IntoIterator<Item = DescriptorRef>,
	{
		let mut added = 0;

		for descriptor in descriptors {
			if self.add(descriptor) {
				added += 1;
			}
		}

		added
	}

	pub fn iter(&self) -> impl Iterator<Item = &DescriptorRef> {
		self.descriptors.values()
	}

	pub fn uids(&self) -> impl Iterator<Item = &DescriptorUid> {
		self.descriptors.keys()
	}

	pub fn clear(&mut self) {
		self.descriptors.clear();
	}
}
