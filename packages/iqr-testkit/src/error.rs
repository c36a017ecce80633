use iqr_domain::DescriptorUid;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0}")]
	Message(String),

	#[error("Descriptor {uid} has no neighbor table entry.")]
	UnknownDescriptor { uid: DescriptorUid },
}
