//! Descriptor handles shared between sessions, indexes, and rankers.

use std::{
	borrow::Borrow,
	fmt,
	hash::{Hash, Hasher},
	sync::Arc,
};

use serde::{Deserialize, Serialize};

/// Stable identity of a descriptor.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DescriptorUid(String);
impl DescriptorUid {
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl fmt::Display for DescriptorUid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
impl From<&str> for DescriptorUid {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}
impl From<String> for DescriptorUid {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl From<u64> for DescriptorUid {
	fn from(value: u64) -> Self {
		Self(value.to_string())
	}
}

/// A feature vector with a stable identity.
///
/// Implementations are owned by whatever produced the vector (an index, a store, a test). The
/// IQR core only ever reads the UID and the vector.
pub trait DescriptorElement
where
	Self: fmt::Debug + Send + Sync,
{
	fn uid(&self) -> &DescriptorUid;

	fn vector(&self) -> &[f32];
}

/// Cheap, shared handle to a descriptor. Equality and hashing follow the UID only.
#[derive(Clone)]
pub struct DescriptorRef(Arc<dyn DescriptorElement>);
impl DescriptorRef {
	pub fn new<D>(element: D) -> Self
	where
		D: DescriptorElement + 'static,
	{
		Self(Arc::new(element))
	}

	pub fn from_arc(element: Arc<dyn DescriptorElement>) -> Self {
		Self(element)
	}

	pub fn uid(&self) -> &DescriptorUid {
		self.0.uid()
	}

	pub fn vector(&self) -> &[f32] {
		self.0.vector()
	}

	pub fn element(&self) -> &Arc<dyn DescriptorElement> {
		&self.0
	}
}
impl fmt::Debug for DescriptorRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DescriptorRef")
			.field("uid", self.uid())
			.field("dims", &self.vector().len())
			.finish()
	}
}
impl PartialEq for DescriptorRef {
	fn eq(&self, other: &Self) -> bool {
		self.uid() == other.uid()
	}
}
impl Eq for DescriptorRef {}
impl Hash for DescriptorRef {
	fn hash<H>(&self, state: &mut H)
	where
		H: Hasher,
	{
		self.uid().hash(state);
	}
}
impl Borrow<DescriptorUid> for DescriptorRef {
	fn borrow(&self) -> &DescriptorUid {
		self.uid()
	}
}

/// Descriptor that keeps its vector in memory.
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryDescriptor {
	uid: DescriptorUid,
	vector: Vec<f32>,
}
impl MemoryDescriptor {
	pub fn new(uid: impl Into<DescriptorUid>, vector: Vec<f32>) -> Self {
		Self { uid: uid.into(), vector }
	}
}
impl DescriptorElement for MemoryDescriptor {
	fn uid(&self) -> &DescriptorUid {
		&self.uid
	}

	fn vector(&self) -> &[f32] {
		&self.vector
	}
}

/// Materializes descriptors from stored `(uid, vector)` pairs.
pub trait DescriptorFactory
where
	Self: Send + Sync,
{
	fn create(&self, uid: DescriptorUid, vector: Vec<f32>) -> DescriptorRef;
}
impl<F> DescriptorFactory for F
where
	F: Fn(DescriptorUid, Vec<f32>) -> DescriptorRef + Send + Sync,
{
	fn create(&self, uid: DescriptorUid, vector: Vec<f32>) -> DescriptorRef {
		(self)(uid, vector)
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryDescriptorFactory;
impl DescriptorFactory for MemoryDescriptorFactory {
	fn create(&self, uid: DescriptorUid, vector: Vec<f32>) -> DescriptorRef {
		DescriptorRef::new(MemoryDescriptor::new(uid, vector))
	}
}
