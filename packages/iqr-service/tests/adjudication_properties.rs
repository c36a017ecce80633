use std::{collections::BTreeSet, sync::Arc};

use indexmap::IndexSet;
use proptest::prelude::*;

use iqr_domain::{DescriptorRef, DescriptorUid, MemoryDescriptorFactory};
use iqr_service::{Adjudication, IqrSession, SessionSettings};
use iqr_testkit::{ScriptedRanker, descriptor, descriptors};

fn new_session() -> IqrSession {
	IqrSession::new(Arc::new(ScriptedRanker::new()), SessionSettings::default())
}

fn uid_set<'a, I>(descriptors: I) -> BTreeSet<DescriptorUid>
where
	I: IntoIterator<Item = &'a DescriptorRef>,
{
	descriptors.into_iter().map(|descriptor| descriptor.uid().clone()).collect()
}

fn uid_pool() -> impl Strategy<Value = Vec<u64>> {
	prop::collection::vec(0_u64..16, 0..12)
}

/// Arbitrary `f32` bit patterns, including NaN payloads, infinities, subnormals, and `-0.0`.
fn labelled_pool() -> impl Strategy<Value = Vec<DescriptorRef>> {
	prop::collection::vec((0_u64..16, prop::collection::vec(any::<u32>(), 1..5)), 0..12).prop_map(
		|entries| {
			entries
				.into_iter()
				.map(|(uid, bits)| {
					let vector: Vec<f32> = bits.into_iter().map(f32::from_bits).collect();

					descriptor(uid, &vector)
				})
				.collect()
		},
	)
}

/// UIDs in set order paired with their component bit patterns.
fn snapshot(descriptors: &IndexSet<DescriptorRef>) -> Vec<(DescriptorUid, Vec<u32>)> {
	descriptors
		.iter()
		.map(|descriptor| {
			let bits = descriptor.vector().iter().map(|value| value.to_bits()).collect();

			(descriptor.uid().clone(), bits)
		})
		.collect()
}

proptest! {
	#[test]
	fn conflicting_labels_leave_membership_unchanged(
		seed_pos in uid_pool(),
		seed_neg in uid_pool(),
		new_pos in uid_pool(),
		new_neg in uid_pool(),
	) {
		let mut session = new_session();
		let seed_neg: Vec<u64> = seed_neg.into_iter().filter(|uid| !seed_pos.contains(uid)).collect();

		session.adjudicate(Adjudication {
			new_positives: descriptors(seed_pos),
			new_negatives: descriptors(seed_neg),
			..Adjudication::default()
		});

		let both: BTreeSet<u64> = new_pos.iter().copied().filter(|uid| new_neg.contains(uid)).collect();
		let before_pos = uid_set(session.positive_descriptors());
		let before_neg = uid_set(session.negative_descriptors());

		session.adjudicate(Adjudication {
			new_positives: descriptors(new_pos),
			new_negatives: descriptors(new_neg),
			..Adjudication::default()
		});

		let after_pos = uid_set(session.positive_descriptors());
		let after_neg = uid_set(session.negative_descriptors());

		for uid in both.into_iter().map(DescriptorUid::from) {
			prop_assert_eq!(before_pos.contains(&uid), after_pos.contains(&uid));
			prop_assert_eq!(before_neg.contains(&uid), after_neg.contains(&uid));
		}

		prop_assert!(after_pos.is_disjoint(&after_neg));
	}

	#[test]
	fn repeated_adjudication_is_idempotent(new_pos in uid_pool(), new_neg in uid_pool()) {
		let mut once = new_session();
		let mut twice = new_session();
		let round = || Adjudication {
			new_positives: descriptors(new_pos.clone()),
			new_negatives: descriptors(new_neg.clone()),
			..Adjudication::default()
		};

		once.adjudicate(round());
		twice.adjudicate(round());
		twice.adjudicate(round());

		prop_assert_eq!(uid_set(once.positive_descriptors()), uid_set(twice.positive_descriptors()));
		prop_assert_eq!(uid_set(once.negative_descriptors()), uid_set(twice.negative_descriptors()));
	}

	#[test]
	fn relabeling_moves_descriptor(uid in 0_u64..16, start_positive in any::<bool>()) {
		let mut session = new_session();
		let descriptor = descriptors([uid]);
		let (first, second) = if start_positive {
			(Adjudication::positives(descriptor.clone()), Adjudication::negatives(descriptor.clone()))
		} else {
			(Adjudication::negatives(descriptor.clone()), Adjudication::positives(descriptor.clone()))
		};

		session.adjudicate(first);
		session.adjudicate(second);

		prop_assert_eq!(session.positive_descriptors().contains(&descriptor[0]), !start_positive);
		prop_assert_eq!(session.negative_descriptors().contains(&descriptor[0]), start_positive);
	}

	#[test]
	fn state_bytes_round_trip(
		pos in labelled_pool(),
		neg in labelled_pool(),
		ext_pos in labelled_pool(),
		ext_neg in labelled_pool(),
	) {
		let mut source = new_session();

		source.adjudicate(Adjudication {
			new_positives: pos,
			new_negatives: neg,
			..Adjudication::default()
		});
		source.external_descriptors(ext_pos, ext_neg);

		let bytes = source.get_state_bytes().expect("State should encode.");
		let mut target = new_session();

		target.set_state_bytes(&bytes, &MemoryDescriptorFactory).expect("State should decode.");

		prop_assert_eq!(snapshot(target.positive_descriptors()), snapshot(source.positive_descriptors()));
		prop_assert_eq!(snapshot(target.negative_descriptors()), snapshot(source.negative_descriptors()));
		prop_assert_eq!(
			snapshot(target.external_positive_descriptors()),
			snapshot(source.external_positive_descriptors())
		);
		prop_assert_eq!(
			snapshot(target.external_negative_descriptors()),
			snapshot(source.external_negative_descriptors())
		);
	}
}
