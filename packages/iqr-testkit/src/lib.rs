//! In-memory collaborators for exercising IQR sessions and controllers in tests.

mod error;

pub use error::{Error, Result};

use std::{
	collections::{HashMap, VecDeque},
	sync::Mutex,
};

use iqr_domain::{DescriptorRef, DescriptorUid, MemoryDescriptor, distance};
use iqr_service::{NearestNeighborsIndex, RankRelevancyWithFeedback};

const DEFAULT_FEEDBACK_LEN: usize = 10;

pub fn descriptor(uid: impl Into<DescriptorUid>, vector: &[f32]) -> DescriptorRef {
	DescriptorRef::new(MemoryDescriptor::new(uid, vector.to_vec()))
}

/// One-dimensional descriptors `uid -> [uid]` for tests that only care about identity.
pub fn descriptors(uids: impl IntoIterator<Item = u64>) -> Vec<DescriptorRef> {
	uids.into_iter().map(|uid| descriptor(uid, &[uid as f32])).collect()
}

/// Index that answers from a fixed neighbor table and records every query.
#[derive(Debug, Default)]
pub struct TableIndex {
	neighbors: HashMap<DescriptorUid, Vec<DescriptorRef>>,
	queries: Mutex<Vec<(DescriptorUid, usize)>>,
}
impl TableIndex {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_neighbors(mut self, query: &DescriptorRef, neighbors: Vec<DescriptorRef>) -> Self {
		self.neighbors.insert(query.uid().clone(), neighbors);

		self
	}

	/// `(query uid, requested count)` for every call so far.
	pub fn queries(&self) -> Vec<(DescriptorUid, usize)> {
		self.queries.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	fn lookup(&self, uid: &DescriptorUid) -> Result<&[DescriptorRef]> {
		self.neighbors
			.get(uid)
			.map(Vec::as_slice)
			.ok_or_else(|| Error::UnknownDescriptor { uid: uid.clone() })
	}
}
impl NearestNeighborsIndex for TableIndex {
	fn nn(
		&self,
		descriptor: &DescriptorRef,
		count: usize,
	) -> color_eyre::Result<(Vec<DescriptorRef>, Vec<f32>)> {
		self.queries
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.push((descriptor.uid().clone(), count));

		let found: Vec<DescriptorRef> =
			self.lookup(descriptor.uid())?.iter().take(count).cloned().collect();
		let distances = found
			.iter()
			.map(|neighbor| {
				distance::euclidean_distance(descriptor.vector(), neighbor.vector())
					.unwrap_or(f32::INFINITY)
			})
			.collect();

		Ok((found, distances))
	}
}

#[derive(Debug)]
pub struct FailingIndex {
	message: String,
}
impl FailingIndex {
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}
}
impl NearestNeighborsIndex for FailingIndex {
	fn nn(
		&self,
		_descriptor: &DescriptorRef,
		_count: usize,
	) -> color_eyre::Result<(Vec<DescriptorRef>, Vec<f32>)> {
		Err(Error::Message(self.message.clone()).into())
	}
}

/// Arguments of one [`RankRelevancyWithFeedback::rank_with_feedback`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct RankCall {
	pub pos: Vec<Vec<f32>>,
	pub neg: Vec<Vec<f32>>,
	pub pool: Vec<Vec<f32>>,
	pub pool_uids: Vec<DescriptorUid>,
}

#[derive(Debug)]
enum RankResponse {
	Scores { scores: Vec<f32>, feedback: Vec<DescriptorUid> },
	Failure(String),
}

/// Ranker that replays queued responses and records its inputs.
///
/// With an empty queue it scores each pool entry by `1 / (1 + d)`, where `d` is the distance to
/// the nearest positive, and proposes the highest scoring entries as feedback.
#[derive(Debug)]
pub struct ScriptedRanker {
	responses: Mutex<VecDeque<RankResponse>>,
	calls: Mutex<Vec<RankCall>>,
	feedback_len: usize,
}
impl ScriptedRanker {
	pub fn new() -> Self {
		Self::with_feedback_len(DEFAULT_FEEDBACK_LEN)
	}

	pub fn with_feedback_len(feedback_len: usize) -> Self {
		Self {
			responses: Mutex::new(VecDeque::new()),
			calls: Mutex::new(Vec::new()),
			feedback_len,
		}
	}

	pub fn push_scores<I>(&self, scores: Vec<f32>, feedback: I)
	where
		I: IntoIterator,
		I::Item: Into<DescriptorUid>,
	{
		self.push(RankResponse::Scores {
			scores,
			feedback: feedback.into_iter().map(Into::into).collect(),
		});
	}

	pub fn push_failure(&self, message: impl Into<String>) {
		self.push(RankResponse::Failure(message.into()));
	}

	pub fn calls(&self) -> Vec<RankCall> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn last_call(&self) -> Option<RankCall> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).last().cloned()
	}

	fn push(&self, response: RankResponse) {
		self.responses.lock().unwrap_or_else(|err| err.into_inner()).push_back(response);
	}

	fn default_response(
		&self,
		pos: &[&[f32]],
		pool: &[&[f32]],
		pool_uids: &[DescriptorUid],
	) -> (Vec<f32>, Vec<DescriptorUid>) {
		let scores: Vec<f32> = pool
			.iter()
			.map(|vector| match distance::nearest_distance(vector, pos.iter().copied()) {
				Some(distance) => 1.0 / (1.0 + distance),
				None => 0.0,
			})
			.collect();
		let mut order: Vec<usize> = (0..pool.len()).collect();

		order.sort_by(|lhs, rhs| scores[*rhs].total_cmp(&scores[*lhs]));

		let feedback =
			order.into_iter().take(self.feedback_len).map(|idx| pool_uids[idx].clone()).collect();

		(scores, feedback)
	}
}
impl Default for ScriptedRanker {
	fn default() -> Self {
		Self::new()
	}
}
impl RankRelevancyWithFeedback for ScriptedRanker {
	fn rank_with_feedback(
		&self,
		pos: &[&[f32]],
		neg: &[&[f32]],
		pool: &[&[f32]],
		pool_uids: &[DescriptorUid],
	) -> color_eyre::Result<(Vec<f32>, Vec<DescriptorUid>)> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).push(RankCall {
			pos: pos.iter().map(|vector| vector.to_vec()).collect(),
			neg: neg.iter().map(|vector| vector.to_vec()).collect(),
			pool: pool.iter().map(|vector| vector.to_vec()).collect(),
			pool_uids: pool_uids.to_vec(),
		});

		let scripted = self.responses.lock().unwrap_or_else(|err| err.into_inner()).pop_front();

		match scripted {
			Some(RankResponse::Scores { scores, feedback }) => Ok((scores, feedback)),
			Some(RankResponse::Failure(message)) => Err(Error::Message(message).into()),
			None => Ok(self.default_response(pos, pool, pool_uids)),
		}
	}
}

#[derive(Debug)]
pub struct FailingRanker {
	message: String,
}
impl FailingRanker {
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}
}
impl RankRelevancyWithFeedback for FailingRanker {
	fn rank_with_feedback(
		&self,
		_pos: &[&[f32]],
		_neg: &[&[f32]],
		_pool: &[&[f32]],
		_pool_uids: &[DescriptorUid],
	) -> color_eyre::Result<(Vec<f32>, Vec<DescriptorUid>)> {
		Err(Error::Message(self.message.clone()).into())
	}
}
