use uuid::Uuid;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("No positive descriptors to query the neighbor index with.")]
	NoPositiveDescriptors,
	#[error("Did not find at least one positive adjudication.")]
	NoPositiveAdjudication,
	#[error("Negative auto-selection failed. Did not select any negative examples.")]
	NegativeAutoSelection,
	#[error("Feedback results in an invalid state: {message}")]
	InvalidFeedbackState { message: String },
	#[error("Ranking returned an invalid result: {message}")]
	InvalidRanking { message: String },
	#[error("Invalid session state: {message}")]
	InvalidState { message: String },
	#[error("Session {session_id} already exists in the controller.")]
	SessionExists { session_id: Uuid },
	#[error("Session {session_id} not found.")]
	SessionNotFound { session_id: Uuid },
	#[error("Invalid controller settings: {message}")]
	InvalidSettings { message: String },
	#[error("Failed to start the session expiration monitor.")]
	Monitor { source: std::io::Error },
	#[error("Nearest-neighbor query failed: {0:#}")]
	NearestNeighbors(color_eyre::Report),
	#[error("Ranking failed: {0:#}")]
	Ranking(color_eyre::Report),
}
