pub mod index;
pub mod ranker;

use std::{
	fs,
	path::{Path, PathBuf},
	sync::Arc,
};

use ahash::{AHashMap, AHashSet};
use clap::Parser;
use color_eyre::eyre;
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use iqr_config::{AutoNegative, Config};
use iqr_domain::{DescriptorRef, DescriptorUid, MemoryDescriptor};
use iqr_service::{Adjudication, ControllerSettings, IqrController, IqrSession, SessionSettings};

use crate::{index::LinearIndex, ranker::CentroidRanker};

#[derive(Debug, Parser)]
#[command(
	version = iqr_cli::VERSION,
	rename_all = "kebab",
	styles = iqr_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[arg(long, short = 'd', value_name = "FILE")]
	pub dataset: PathBuf,
	/// Refinement rounds per query.
	#[arg(long, value_name = "N", default_value_t = 3)]
	pub rounds: u32,
	/// Cutoff for precision@k.
	#[arg(long, value_name = "N", default_value_t = 10)]
	pub top_k: u32,
	/// Feedback items the oracle adjudicates after each round.
	#[arg(long, value_name = "N", default_value_t = 5)]
	pub feedback_size: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct EvalOptions {
	pub rounds: u32,
	pub top_k: u32,
	pub feedback_size: u32,
}
impl From<&Args> for EvalOptions {
	fn from(args: &Args) -> Self {
		Self { rounds: args.rounds, top_k: args.top_k, feedback_size: args.feedback_size }
	}
}

#[derive(Debug, Deserialize)]
pub struct EvalDataset {
	pub name: Option<String>,
	pub descriptors: Vec<EvalDescriptor>,
	pub queries: Vec<EvalQuery>,
}

#[derive(Debug, Deserialize)]
pub struct EvalDescriptor {
	pub uid: DescriptorUid,
	pub vector: Vec<f32>,
	#[serde(default)]
	pub labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EvalQuery {
	pub id: Option<String>,
	/// Descriptors carrying this label count as relevant.
	pub label: String,
	/// Initial positive adjudications.
	pub seeds: Vec<DescriptorUid>,
}

#[derive(Debug, Serialize)]
pub struct EvalOutput {
	pub generated_at: String,
	pub dataset: EvalDatasetInfo,
	pub settings: EvalSettings,
	pub summary: EvalSummary,
	pub queries: Vec<QueryReport>,
}

#[derive(Debug, Serialize)]
pub struct EvalDatasetInfo {
	pub name: String,
	pub descriptor_count: usize,
	pub query_count: usize,
}

#[derive(Debug, Serialize)]
pub struct EvalSettings {
	pub rounds: u32,
	pub top_k: u32,
	pub feedback_size: u32,
	pub pos_seed_neighbors: u32,
	pub auto_negative: AutoNegative,
}

#[derive(Debug, Serialize)]
pub struct EvalSummary {
	/// Mean precision@k across queries, one entry per round.
	pub avg_precision_at_k_by_round: Vec<f64>,
	pub final_avg_precision_at_k: f64,
}

#[derive(Debug, Serialize)]
pub struct QueryReport {
	pub id: String,
	pub label: String,
	pub session_id: Uuid,
	pub rounds: Vec<RoundReport>,
}

#[derive(Debug, Serialize)]
pub struct RoundReport {
	pub round: u32,
	pub working_set_size: usize,
	pub positive_count: usize,
	pub negative_count: usize,
	pub relevant_in_top_k: usize,
	pub precision_at_k: f64,
	pub top_k_uids: Vec<DescriptorUid>,
}

struct LabelledCorpus {
	index: LinearIndex,
	by_uid: AHashMap<DescriptorUid, DescriptorRef>,
	labels: AHashMap<DescriptorUid, AHashSet<String>>,
}
impl LabelledCorpus {
	fn new(dataset: &EvalDataset) -> color_eyre::Result<Self> {
		let mut by_uid = AHashMap::with_capacity(dataset.descriptors.len());
		let mut labels = AHashMap::with_capacity(dataset.descriptors.len());
		let mut ordered = Vec::with_capacity(dataset.descriptors.len());

		for entry in &dataset.descriptors {
			let descriptor =
				DescriptorRef::new(MemoryDescriptor::new(entry.uid.clone(), entry.vector.clone()));

			if by_uid.insert(entry.uid.clone(), descriptor.clone()).is_some() {
				return Err(eyre::eyre!("Dataset descriptor {} is listed twice.", entry.uid));
			}

			labels.insert(entry.uid.clone(), entry.labels.iter().cloned().collect());
			ordered.push(descriptor);
		}

		Ok(Self { index: LinearIndex::new(ordered), by_uid, labels })
	}

	fn is_relevant(&self, uid: &DescriptorUid, label: &str) -> bool {
		self.labels.get(uid).is_some_and(|labels| labels.contains(label))
	}

	fn resolve(&self, uid: &DescriptorUid) -> color_eyre::Result<DescriptorRef> {
		self.by_uid
			.get(uid)
			.cloned()
			.ok_or_else(|| eyre::eyre!("Seed descriptor {uid} is not in the dataset."))
	}
}

pub fn run(args: Args) -> color_eyre::Result<()> {
	let config = iqr_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let dataset = load_dataset(&args.dataset)?;
	let output = evaluate(&config, &dataset, EvalOptions::from(&args))?;
	let json = serde_json::to_string_pretty(&output)?;

	println!("{json}");

	Ok(())
}

pub fn load_dataset(path: &Path) -> color_eyre::Result<EvalDataset> {
	let raw = fs::read_to_string(path)?;
	let dataset: EvalDataset = serde_json::from_str(&raw)?;

	if dataset.queries.is_empty() {
		return Err(eyre::eyre!("Dataset must include at least one query."));
	}
	if dataset.descriptors.is_empty() {
		return Err(eyre::eyre!("Dataset must include at least one descriptor."));
	}

	Ok(dataset)
}

/// Runs every query through simulated refinement rounds with an oracle adjudicating feedback.
pub fn evaluate(
	config: &Config,
	dataset: &EvalDataset,
	options: EvalOptions,
) -> color_eyre::Result<EvalOutput> {
	if options.rounds == 0 {
		return Err(eyre::eyre!("At least one round is required."));
	}
	if options.top_k == 0 {
		return Err(eyre::eyre!("top_k must be greater than zero."));
	}

	let corpus = LabelledCorpus::new(dataset)?;
	let controller = IqrController::new(ControllerSettings::from(&config.controller))?;
	let ranker = Arc::new(CentroidRanker::new(options.feedback_size as usize));
	let session_settings = SessionSettings::from(&config.session);
	let mut queries = Vec::with_capacity(dataset.queries.len());

	for (idx, query) in dataset.queries.iter().enumerate() {
		let id = query.id.clone().unwrap_or_else(|| format!("q{}", idx + 1));
		let session = IqrSession::new(ranker.clone(), session_settings);
		let session_id = controller.add_session_with_default_timeout(session)?;
		let rounds = run_query(&controller, &corpus, session_id, query, options);

		controller.remove_session(&session_id)?;

		let rounds = rounds?;

		tracing::info!(
			query = %id,
			%session_id,
			final_precision = rounds.last().map(|round| round.precision_at_k).unwrap_or_default(),
			"Query evaluated."
		);

		queries.push(QueryReport { id, label: query.label.clone(), session_id, rounds });
	}

	let summary = summarize(&queries, options.rounds as usize);

	Ok(EvalOutput {
		generated_at: OffsetDateTime::now_utc().format(&Rfc3339)?,
		dataset: EvalDatasetInfo {
			name: dataset.name.clone().unwrap_or_else(|| "unnamed".to_string()),
			descriptor_count: dataset.descriptors.len(),
			query_count: dataset.queries.len(),
		},
		settings: EvalSettings {
			rounds: options.rounds,
			top_k: options.top_k,
			feedback_size: options.feedback_size,
			pos_seed_neighbors: config.session.pos_seed_neighbors,
			auto_negative: config.session.auto_negative,
		},
		summary,
		queries,
	})
}

fn run_query(
	controller: &IqrController,
	corpus: &LabelledCorpus,
	session_id: Uuid,
	query: &EvalQuery,
	options: EvalOptions,
) -> color_eyre::Result<Vec<RoundReport>> {
	let seeds =
		query.seeds.iter().map(|uid| corpus.resolve(uid)).collect::<color_eyre::Result<Vec<_>>>()?;
	let handle = controller.get_session(&session_id)?;
	let mut session = handle.lock();
	let mut rounds = Vec::with_capacity(options.rounds as usize);

	session.adjudicate(Adjudication::positives(seeds));

	for round in 1..=options.rounds {
		session.update_working_set(&corpus.index)?;
		session.refine()?;

		let top_k: Vec<DescriptorUid> = session
			.ordered_results()
			.into_iter()
			.take(options.top_k as usize)
			.map(|(descriptor, _)| descriptor.uid().clone())
			.collect();
		let relevant_in_top_k =
			top_k.iter().filter(|uid| corpus.is_relevant(uid, &query.label)).count();
		let precision_at_k = precision(relevant_in_top_k, top_k.len());

		tracing::debug!(%session_id, round, precision_at_k, "Round complete.");

		rounds.push(RoundReport {
			round,
			working_set_size: session.working_set().len(),
			positive_count: session.positive_descriptors().len(),
			negative_count: session.negative_descriptors().len(),
			relevant_in_top_k,
			precision_at_k,
			top_k_uids: top_k,
		});

		let (relevant, irrelevant): (Vec<DescriptorRef>, Vec<DescriptorRef>) = session
			.feedback_results()
			.into_iter()
			.partition(|descriptor| corpus.is_relevant(descriptor.uid(), &query.label));

		session.adjudicate(Adjudication {
			new_positives: relevant,
			new_negatives: irrelevant,
			..Adjudication::default()
		});
	}

	Ok(rounds)
}

fn precision(relevant: usize, retrieved: usize) -> f64 {
	if retrieved == 0 {
		return 0.0;
	}

	relevant as f64 / retrieved as f64
}

fn summarize(queries: &[QueryReport], rounds: usize) -> EvalSummary {
	let count = queries.len().max(1) as f64;
	let avg_precision_at_k_by_round: Vec<f64> = (0..rounds)
		.map(|round| {
			queries
				.iter()
				.filter_map(|query| query.rounds.get(round))
				.map(|report| report.precision_at_k)
				.sum::<f64>()
				/ count
		})
		.collect();
	let final_avg_precision_at_k = avg_precision_at_k_by_round.last().copied().unwrap_or_default();

	EvalSummary { avg_precision_at_k_by_round, final_avg_precision_at_k }
}
