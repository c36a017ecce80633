//! IQR session state machine: adjudications, working set, ranking results, and sorted views.

mod state;

use std::{fmt, sync::Arc};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use iqr_config::AutoNegative;
use iqr_domain::{DescriptorFactory, DescriptorRef, DescriptorUid, WorkingSet};

use crate::{Error, NearestNeighborsIndex, RankRelevancyWithFeedback, Result, negative};

const DEFAULT_POS_SEED_NEIGHBORS: usize = 500;

/// `(descriptor, score)` pairs sorted by descending score.
pub type RelevancyList = Vec<(DescriptorRef, f32)>;

#[derive(Clone, Copy, Debug)]
pub struct SessionSettings {
	/// Neighbors requested per positive descriptor in [`IqrSession::update_working_set`].
	pub pos_seed_neighbors: usize,
	pub auto_negative: AutoNegative,
}
impl Default for SessionSettings {
	fn default() -> Self {
		Self {
			pos_seed_neighbors: DEFAULT_POS_SEED_NEIGHBORS,
			auto_negative: AutoNegative::default(),
		}
	}
}
impl From<&iqr_config::Session> for SessionSettings {
	fn from(cfg: &iqr_config::Session) -> Self {
		Self {
			pos_seed_neighbors: cfg.pos_seed_neighbors as usize,
			auto_negative: cfg.auto_negative,
		}
	}
}

/// One round of adjudication input. Every list is optional; leave it empty to skip it.
#[derive(Clone, Debug, Default)]
pub struct Adjudication {
	pub new_positives: Vec<DescriptorRef>,
	pub new_negatives: Vec<DescriptorRef>,
	pub un_positives: Vec<DescriptorRef>,
	pub un_negatives: Vec<DescriptorRef>,
}
impl Adjudication {
	pub fn positives<I>(descriptors: I) -> Self
	where
		I: IntoIterator<Item = DescriptorRef>,
	{
		Self { new_positives: descriptors.into_iter().collect(), ..Self::default() }
	}

	pub fn negatives<I>(descriptors: I) -> Self
	where
		I: IntoIterator<Item = DescriptorRef>,
	{
		Self { new_negatives: descriptors.into_iter().collect(), ..Self::default() }
	}
}

/// Serializable summary of a session's adjudications and last ranking inputs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
	pub session_id: Uuid,
	pub positive: Vec<DescriptorUid>,
	pub negative: Vec<DescriptorUid>,
	pub external_positive: Vec<DescriptorUid>,
	pub external_negative: Vec<DescriptorUid>,
	pub contributing_positive: Vec<DescriptorUid>,
	pub contributing_negative: Vec<DescriptorUid>,
	pub contributing_external_positive: Vec<DescriptorUid>,
	pub contributing_external_negative: Vec<DescriptorUid>,
	pub working_set_size: usize,
}

#[derive(Debug, Default)]
struct ViewCache {
	ordered_pos: Option<RelevancyList>,
	ordered_neg: Option<RelevancyList>,
	ordered_non_adj: Option<RelevancyList>,
	ordered_results: Option<RelevancyList>,
}

/// State of one interactive query refinement loop.
///
/// The session is not internally synchronized. Callers sharing it across threads hold a lock for
/// the whole adjudicate, refine, read sequence; [`crate::IqrController`] hands sessions out
/// behind a mutex for that purpose.
pub struct IqrSession {
	uid: Uuid,
	settings: SessionSettings,
	ranker: Arc<dyn RankRelevancyWithFeedback>,
	positive: IndexSet<DescriptorRef>,
	negative: IndexSet<DescriptorRef>,
	external_positive: IndexSet<DescriptorRef>,
	external_negative: IndexSet<DescriptorRef>,
	working_set: WorkingSet,
	results: Option<IndexMap<DescriptorRef, f32>>,
	feedback_list: Option<Vec<DescriptorRef>>,
	rank_contrib_pos: IndexSet<DescriptorRef>,
	rank_contrib_neg: IndexSet<DescriptorRef>,
	rank_contrib_pos_ext: IndexSet<DescriptorRef>,
	rank_contrib_neg_ext: IndexSet<DescriptorRef>,
	cache: ViewCache,
}
impl IqrSession {
	pub fn new(ranker: Arc<dyn RankRelevancyWithFeedback>, settings: SessionSettings) -> Self {
		Self::with_uid(Uuid::new_v4(), ranker, settings)
	}

	pub fn with_uid(
		uid: Uuid,
		ranker: Arc<dyn RankRelevancyWithFeedback>,
		settings: SessionSettings,
	) -> Self {
		Self {
			uid,
			settings,
			ranker,
			positive: IndexSet::new(),
			negative: IndexSet::new(),
			external_positive: IndexSet::new(),
			external_negative: IndexSet::new(),
			working_set: WorkingSet::new(),
			results: None,
			feedback_list: None,
			rank_contrib_pos: IndexSet::new(),
			rank_contrib_neg: IndexSet::new(),
			rank_contrib_pos_ext: IndexSet::new(),
			rank_contrib_neg_ext: IndexSet::new(),
			cache: ViewCache::default(),
		}
	}

	pub fn uid(&self) -> Uuid {
		self.uid
	}

	pub fn settings(&self) -> &SessionSettings {
		&self.settings
	}

	pub fn positive_descriptors(&self) -> &IndexSet<DescriptorRef> {
		&self.positive
	}

	pub fn negative_descriptors(&self) -> &IndexSet<DescriptorRef> {
		&self.negative
	}

	pub fn external_positive_descriptors(&self) -> &IndexSet<DescriptorRef> {
		&self.external_positive
	}

	pub fn external_negative_descriptors(&self) -> &IndexSet<DescriptorRef> {
		&self.external_negative
	}

	pub fn working_set(&self) -> &WorkingSet {
		&self.working_set
	}

	/// Scores from the last refine, keyed in working-set order.
	pub fn results(&self) -> Option<&IndexMap<DescriptorRef, f32>> {
		self.results.as_ref()
	}

	pub fn rank_contrib_pos(&self) -> &IndexSet<DescriptorRef> {
		&self.rank_contrib_pos
	}

	pub fn rank_contrib_neg(&self) -> &IndexSet<DescriptorRef> {
		&self.rank_contrib_neg
	}

	pub fn rank_contrib_pos_ext(&self) -> &IndexSet<DescriptorRef> {
		&self.rank_contrib_pos_ext
	}

	pub fn rank_contrib_neg_ext(&self) -> &IndexSet<DescriptorRef> {
		&self.rank_contrib_neg_ext
	}

	/// Applies one round of adjudication.
	///
	/// A descriptor listed as both a new positive and a new negative is ignored. New labels
	/// replace the opposite label. View caches are only invalidated when the positive or
	/// negative set actually changes.
	pub fn adjudicate(&mut self, adjudication: Adjudication) {
		let Adjudication { new_positives, new_negatives, un_positives, un_negatives } =
			adjudication;
		let new_negative_set: IndexSet<&DescriptorRef> = new_negatives.iter().collect();
		let both: IndexSet<&DescriptorRef> =
			new_positives.iter().filter(|descriptor| new_negative_set.contains(descriptor)).collect();
		let positive_before = self.positive.clone();
		let negative_before = self.negative.clone();

		for descriptor in new_positives.iter().filter(|descriptor| !both.contains(descriptor)) {
			self.positive.insert(descriptor.clone());
			self.negative.shift_remove(descriptor);
		}
		for descriptor in new_negatives.iter().filter(|descriptor| !both.contains(descriptor)) {
			self.negative.insert(descriptor.clone());
			self.positive.shift_remove(descriptor);
		}
		for descriptor in &un_positives {
			self.positive.shift_remove(descriptor);
		}
		for descriptor in &un_negatives {
			self.negative.shift_remove(descriptor);
		}

		let positive_changed = self.positive != positive_before;
		let negative_changed = self.negative != negative_before;

		if positive_changed {
			self.cache.ordered_pos = None;
			self.cache.ordered_non_adj = None;
		}
		if negative_changed {
			self.cache.ordered_neg = None;
			self.cache.ordered_non_adj = None;
		}

		tracing::debug!(
			session_id = %self.uid,
			positives = self.positive.len(),
			negatives = self.negative.len(),
			ignored = both.len(),
			positive_changed,
			negative_changed,
			"Adjudication applied."
		);
	}

	/// Adds externally sourced examples. External sets only accumulate; they are never reconciled
	/// against each other or against the session's own adjudications.
	pub fn external_descriptors<P, N>(&mut self, positive: P, negative: N)
	where
		P: IntoIterator<Item = DescriptorRef>,
		N: IntoIterator<Item = DescriptorRef>,
	{
		self.external_positive.extend(positive);
		self.external_negative.extend(negative);
	}

	/// Seeds the working set directly. Returns how many descriptors were new.
	pub fn extend_working_set<I>(&mut self, descriptors: I) -> usize
	where
		I: IntoIterator<Item = DescriptorRef>,
	{
		self.working_set.add_many(descriptors)
	}

	/// Grows the working set with the nearest neighbors of every positive example.
	///
	/// The working set is only touched after every index query has succeeded.
	pub fn update_working_set(&mut self, nn_index: &dyn NearestNeighborsIndex) -> Result<()> {
		if self.positive.is_empty() && self.external_positive.is_empty() {
			return Err(Error::NoPositiveDescriptors);
		}

		let mut neighbors = Vec::new();

		for descriptor in self.positive.union(&self.external_positive) {
			let (found, _distances) = nn_index
				.nn(descriptor, self.settings.pos_seed_neighbors)
				.map_err(Error::NearestNeighbors)?;

			neighbors.extend(found);
		}

		let added = self.working_set.add_many(neighbors);

		tracing::debug!(
			session_id = %self.uid,
			added,
			working_set = self.working_set.len(),
			"Working set updated."
		);

		Ok(())
	}

	/// Ranks the working set against the current positive and negative examples.
	///
	/// When there are no negatives at all, the working-set entry least similar to the positives
	/// stands in as the only negative for this call. Results, feedback, and the contributing
	/// snapshots are replaced only after the ranker succeeds.
	pub fn refine(&mut self) -> Result<()> {
		let pos_all: IndexSet<DescriptorRef> =
			self.positive.union(&self.external_positive).cloned().collect();
		let neg_all: IndexSet<DescriptorRef> =
			self.negative.union(&self.external_negative).cloned().collect();

		if pos_all.is_empty() {
			return Err(Error::NoPositiveAdjudication);
		}

		let pos_vectors: Vec<&[f32]> = pos_all.iter().map(DescriptorRef::vector).collect();
		let auto_negative = if neg_all.is_empty() {
			let candidates =
				self.working_set.iter().filter(|descriptor| !pos_all.contains(*descriptor));
			let selected = negative::select_auto_negative(
				self.settings.auto_negative,
				candidates,
				&pos_vectors,
			)
			.ok_or(Error::NegativeAutoSelection)?;

			tracing::debug!(
				session_id = %self.uid,
				descriptor = %selected.uid(),
				"Auto-selected negative example."
			);

			Some(selected)
		} else {
			None
		};
		let neg_vectors: Vec<&[f32]> = match &auto_negative {
			Some(selected) => vec![selected.vector()],
			None => neg_all.iter().map(DescriptorRef::vector).collect(),
		};
		let pool: Vec<DescriptorRef> = self.working_set.iter().cloned().collect();
		let pool_uids: Vec<DescriptorUid> =
			pool.iter().map(|descriptor| descriptor.uid().clone()).collect();
		let pool_vectors: Vec<&[f32]> = pool.iter().map(DescriptorRef::vector).collect();
		let (scores, feedback_uids) = self
			.ranker
			.rank_with_feedback(&pos_vectors, &neg_vectors, &pool_vectors, &pool_uids)
			.map_err(Error::Ranking)?;

		if scores.len() != pool.len() {
			return Err(Error::InvalidRanking {
				message: format!("Expected {} scores, got {}.", pool.len(), scores.len()),
			});
		}

		let mut feedback = Vec::with_capacity(feedback_uids.len());

		for uid in &feedback_uids {
			let descriptor = self.working_set.get(uid).ok_or_else(|| Error::InvalidFeedbackState {
				message: format!("Feedback UID {uid} is not in the working set."),
			})?;

			feedback.push(descriptor.clone());
		}

		let results: IndexMap<DescriptorRef, f32> = pool.into_iter().zip(scores).collect();

		tracing::debug!(
			session_id = %self.uid,
			pool = results.len(),
			feedback = feedback.len(),
			positives = pos_all.len(),
			negatives = neg_vectors.len(),
			auto_negative = auto_negative.is_some(),
			"Session refined."
		);

		self.results = Some(results);
		self.feedback_list = Some(feedback);
		self.rank_contrib_pos = self.positive.clone();
		self.rank_contrib_pos_ext = self.external_positive.clone();
		self.rank_contrib_neg =
			if auto_negative.is_some() { IndexSet::new() } else { self.negative.clone() };
		self.rank_contrib_neg_ext = self.external_negative.clone();
		self.cache = ViewCache::default();

		Ok(())
	}

	/// Every ranked descriptor, highest score first.
	pub fn ordered_results(&mut self) -> RelevancyList {
		let Some(results) = self.results.as_ref().filter(|results| !results.is_empty()) else {
			return Vec::new();
		};

		if let Some(cached) = &self.cache.ordered_results {
			return cached.clone();
		}

		let ordered = sort_by_score(results.iter());

		self.cache.ordered_results = Some(ordered.clone());

		ordered
	}

	/// Ranked descriptors that were positive adjudications at the last refine.
	pub fn get_positive_adjudication_relevancy(&mut self) -> RelevancyList {
		if let Some(cached) = &self.cache.ordered_pos {
			return cached.clone();
		}

		let Some(results) = &self.results else { return Vec::new() };
		let ordered = sort_by_score(
			results.iter().filter(|(descriptor, _)| self.rank_contrib_pos.contains(*descriptor)),
		);

		self.cache.ordered_pos = Some(ordered.clone());

		ordered
	}

	/// Ranked descriptors that were negative adjudications at the last refine.
	pub fn get_negative_adjudication_relevancy(&mut self) -> RelevancyList {
		if let Some(cached) = &self.cache.ordered_neg {
			return cached.clone();
		}

		let Some(results) = &self.results else { return Vec::new() };
		let ordered = sort_by_score(
			results.iter().filter(|(descriptor, _)| self.rank_contrib_neg.contains(*descriptor)),
		);

		self.cache.ordered_neg = Some(ordered.clone());

		ordered
	}

	/// Ranked descriptors that were neither positive nor negative at the last refine.
	pub fn get_unadjudicated_relevancy(&mut self) -> RelevancyList {
		if let Some(cached) = &self.cache.ordered_non_adj {
			return cached.clone();
		}

		let Some(results) = &self.results else { return Vec::new() };
		let ordered = sort_by_score(results.iter().filter(|(descriptor, _)| {
			!self.rank_contrib_pos.contains(*descriptor)
				&& !self.rank_contrib_neg.contains(*descriptor)
		}));

		self.cache.ordered_non_adj = Some(ordered.clone());

		ordered
	}

	/// Descriptors the last refine proposed for adjudication, in ranker order.
	pub fn feedback_results(&self) -> Vec<DescriptorRef> {
		self.feedback_list.clone().unwrap_or_default()
	}

	pub fn reset(&mut self) {
		self.positive.clear();
		self.negative.clear();
		self.external_positive.clear();
		self.external_negative.clear();
		self.working_set.clear();
		self.results = None;
		self.feedback_list = None;
		self.rank_contrib_pos.clear();
		self.rank_contrib_neg.clear();
		self.rank_contrib_pos_ext.clear();
		self.rank_contrib_neg_ext.clear();
		self.cache = ViewCache::default();

		tracing::debug!(session_id = %self.uid, "Session reset.");
	}

	pub fn info(&self) -> SessionInfo {
		SessionInfo {
			session_id: self.uid,
			positive: collect_uids(&self.positive),
			negative: collect_uids(&self.negative),
			external_positive: collect_uids(&self.external_positive),
			external_negative: collect_uids(&self.external_negative),
			contributing_positive: collect_uids(&self.rank_contrib_pos),
			contributing_negative: collect_uids(&self.rank_contrib_neg),
			contributing_external_positive: collect_uids(&self.rank_contrib_pos_ext),
			contributing_external_negative: collect_uids(&self.rank_contrib_neg_ext),
			working_set_size: self.working_set.len(),
		}
	}

	/// Encodes the four adjudication sets. Working set, results, and caches are not included.
	pub fn get_state_bytes(&self) -> Result<Vec<u8>> {
		state::encode(state::AdjudicationSets {
			positive: &self.positive,
			negative: &self.negative,
			external_positive: &self.external_positive,
			external_negative: &self.external_negative,
		})
	}

	/// Replaces the four adjudication sets with the ones encoded in `bytes`.
	///
	/// Nothing changes when decoding fails.
	pub fn set_state_bytes(&mut self, bytes: &[u8], factory: &dyn DescriptorFactory) -> Result<()> {
		let decoded = state::decode(bytes, factory)?;

		self.positive = decoded.positive;
		self.negative = decoded.negative;
		self.external_positive = decoded.external_positive;
		self.external_negative = decoded.external_negative;
		self.cache.ordered_pos = None;
		self.cache.ordered_neg = None;
		self.cache.ordered_non_adj = None;

		tracing::debug!(
			session_id = %self.uid,
			positives = self.positive.len(),
			negatives = self.negative.len(),
			"Session state restored."
		);

		Ok(())
	}
}
impl fmt::Debug for IqrSession {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("IqrSession")
			.field("uid", &self.uid)
			.field("settings", &self.settings)
			.field("positive", &self.positive.len())
			.field("negative", &self.negative.len())
			.field("external_positive", &self.external_positive.len())
			.field("external_negative", &self.external_negative.len())
			.field("working_set", &self.working_set.len())
			.finish_non_exhaustive()
	}
}

fn sort_by_score<'a, I>(entries: I) -> RelevancyList
where
	I: IntoIterator<Item = (&'a DescriptorRef, &'a f32)>,
{
	let mut ordered: RelevancyList =
		entries.into_iter().map(|(descriptor, score)| (descriptor.clone(), *score)).collect();

	ordered.sort_by(|lhs, rhs| rhs.1.total_cmp(&lhs.1));

	ordered
}

fn collect_uids(descriptors: &IndexSet<DescriptorRef>) -> Vec<DescriptorUid> {
	descriptors.iter().map(|descriptor| descriptor.uid().clone()).collect()
}

#[cfg(test)]
mod tests {
	use color_eyre::Result as EyreResult;

	use iqr_domain::MemoryDescriptor;

	use super::*;

	struct ConstantRanker;
	impl RankRelevancyWithFeedback for ConstantRanker {
		fn rank_with_feedback(
			&self,
			_pos: &[&[f32]],
			_neg: &[&[f32]],
			pool: &[&[f32]],
			_pool_uids: &[DescriptorUid],
		) -> EyreResult<(Vec<f32>, Vec<DescriptorUid>)> {
			Ok((vec![0.5; pool.len()], Vec::new()))
		}
	}

	fn session() -> IqrSession {
		IqrSession::new(Arc::new(ConstantRanker), SessionSettings::default())
	}

	fn descriptor(uid: u64) -> DescriptorRef {
		DescriptorRef::new(MemoryDescriptor::new(uid, vec![uid as f32]))
	}

	fn sentinel() -> RelevancyList {
		vec![(descriptor(99), 1.0), (descriptor(98), 2.0)]
	}

	fn fill_caches(session: &mut IqrSession) {
		session.cache.ordered_pos = Some(sentinel());
		session.cache.ordered_neg = Some(sentinel());
		session.cache.ordered_non_adj = Some(sentinel());
		session.cache.ordered_results = Some(sentinel());
	}

	#[test]
	fn new_positive_resets_positive_and_unadjudicated_views() {
		let mut session = session();

		fill_caches(&mut session);
		session.adjudicate(Adjudication::positives([descriptor(0)]));

		assert!(session.cache.ordered_pos.is_none());
		assert!(session.cache.ordered_neg.is_some());
		assert!(session.cache.ordered_non_adj.is_none());
		assert!(session.cache.ordered_results.is_some());
	}

	#[test]
	fn new_negative_resets_negative_and_unadjudicated_views() {
		let mut session = session();

		fill_caches(&mut session);
		session.adjudicate(Adjudication::negatives([descriptor(0)]));

		assert!(session.cache.ordered_pos.is_some());
		assert!(session.cache.ordered_neg.is_none());
		assert!(session.cache.ordered_non_adj.is_none());
	}

	#[test]
	fn label_switch_resets_both_adjudicated_views() {
		let mut session = session();

		session.adjudicate(Adjudication::positives([descriptor(0)]));
		fill_caches(&mut session);
		session.adjudicate(Adjudication::negatives([descriptor(0)]));

		assert!(session.cache.ordered_pos.is_none());
		assert!(session.cache.ordered_neg.is_none());
		assert!(session.cache.ordered_non_adj.is_none());
	}

	#[test]
	fn no_net_change_keeps_views() {
		let mut session = session();

		session.adjudicate(Adjudication {
			new_positives: vec![descriptor(0), descriptor(1)],
			new_negatives: vec![descriptor(3)],
			..Adjudication::default()
		});
		fill_caches(&mut session);

		session.adjudicate(Adjudication::default());
		session.adjudicate(Adjudication::positives([descriptor(0)]));
		session.adjudicate(Adjudication::negatives([descriptor(3)]));
		session.adjudicate(Adjudication {
			un_positives: vec![descriptor(5)],
			un_negatives: vec![descriptor(5)],
			..Adjudication::default()
		});
		// Added and withdrawn in the same call.
		session.adjudicate(Adjudication {
			new_positives: vec![descriptor(6)],
			un_positives: vec![descriptor(6)],
			..Adjudication::default()
		});
		session.adjudicate(Adjudication {
			new_positives: vec![descriptor(7)],
			new_negatives: vec![descriptor(7)],
			..Adjudication::default()
		});

		assert!(session.cache.ordered_pos.is_some());
		assert!(session.cache.ordered_neg.is_some());
		assert!(session.cache.ordered_non_adj.is_some());
	}

	#[test]
	fn ordered_results_serves_cache_without_resorting() {
		let mut session = session();

		session.extend_working_set([descriptor(0), descriptor(1)]);
		session.adjudicate(Adjudication::positives([descriptor(0)]));
		session.refine().expect("Refine should succeed.");
		session.cache.ordered_results = Some(sentinel());

		assert_eq!(session.ordered_results(), sentinel());
	}

	#[test]
	fn ordered_results_ignores_cache_without_results() {
		let mut session = session();

		session.cache.ordered_results = Some(sentinel());

		assert!(session.ordered_results().is_empty());
	}

	#[test]
	fn bucket_views_serve_cache_before_results_exist() {
		let mut session = session();

		fill_caches(&mut session);

		assert_eq!(session.get_positive_adjudication_relevancy(), sentinel());
		assert_eq!(session.get_negative_adjudication_relevancy(), sentinel());
		assert_eq!(session.get_unadjudicated_relevancy(), sentinel());
	}

	#[test]
	fn views_populate_their_caches() {
		let mut session = session();

		session.extend_working_set([descriptor(0), descriptor(1), descriptor(2)]);
		session.adjudicate(Adjudication {
			new_positives: vec![descriptor(0)],
			new_negatives: vec![descriptor(1)],
			..Adjudication::default()
		});
		session.refine().expect("Refine should succeed.");

		assert!(session.cache.ordered_pos.is_none());

		let positive = session.get_positive_adjudication_relevancy();
		let negative = session.get_negative_adjudication_relevancy();
		let unadjudicated = session.get_unadjudicated_relevancy();
		let all = session.ordered_results();

		assert_eq!(session.cache.ordered_pos.as_ref(), Some(&positive));
		assert_eq!(session.cache.ordered_neg.as_ref(), Some(&negative));
		assert_eq!(session.cache.ordered_non_adj.as_ref(), Some(&unadjudicated));
		assert_eq!(session.cache.ordered_results.as_ref(), Some(&all));
	}

	#[test]
	fn refine_resets_every_view() {
		let mut session = session();

		session.extend_working_set([descriptor(0), descriptor(1)]);
		session.adjudicate(Adjudication::positives([descriptor(0)]));
		fill_caches(&mut session);
		session.refine().expect("Refine should succeed.");

		assert!(session.cache.ordered_pos.is_none());
		assert!(session.cache.ordered_neg.is_none());
		assert!(session.cache.ordered_non_adj.is_none());
		assert!(session.cache.ordered_results.is_none());
	}

	#[test]
	fn reset_clears_views() {
		let mut session = session();

		fill_caches(&mut session);
		session.reset();

		assert!(session.cache.ordered_pos.is_none());
		assert!(session.cache.ordered_neg.is_none());
		assert!(session.cache.ordered_non_adj.is_none());
		assert!(session.cache.ordered_results.is_none());
	}

	#[test]
	fn restoring_state_resets_adjudication_views() {
		let mut source = session();

		source.adjudicate(Adjudication::positives([descriptor(0)]));

		let bytes = source.get_state_bytes().expect("Encoding should succeed.");
		let mut target = session();

		fill_caches(&mut target);
		target
			.set_state_bytes(&bytes, &iqr_domain::MemoryDescriptorFactory)
			.expect("Decoding should succeed.");

		assert!(target.cache.ordered_pos.is_none());
		assert!(target.cache.ordered_neg.is_none());
		assert!(target.cache.ordered_non_adj.is_none());
		assert!(target.cache.ordered_results.is_some());
	}
}
