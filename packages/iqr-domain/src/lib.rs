pub mod descriptor;
pub mod distance;
pub mod working_set;

pub use descriptor::{
	DescriptorElement, DescriptorFactory, DescriptorRef, DescriptorUid, MemoryDescriptor,
	MemoryDescriptorFactory,
};
pub use working_set::WorkingSet;
