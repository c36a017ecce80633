use std::{
	collections::HashSet,
	sync::atomic::{AtomicUsize, Ordering},
};

use iqr_domain::{
	DescriptorFactory, DescriptorRef, DescriptorUid, MemoryDescriptor, MemoryDescriptorFactory,
	WorkingSet, distance,
};

fn descriptor(uid: u64, vector: &[f32]) -> DescriptorRef {
	DescriptorRef::new(MemoryDescriptor::new(uid, vector.to_vec()))
}

#[test]
fn descriptor_identity_follows_uid() {
	let a = descriptor(1, &[0.0, 1.0]);
	let same_uid = descriptor(1, &[5.0, 5.0]);
	let other = descriptor(2, &[0.0, 1.0]);

	assert_eq!(a, same_uid);
	assert_ne!(a, other);

	let set: HashSet<DescriptorRef> = [a, same_uid, other].into_iter().collect();

	assert_eq!(set.len(), 2);
	assert!(set.contains(&DescriptorUid::from(1_u64)));
}

#[test]
fn descriptor_uid_serializes_as_plain_string() {
	let uid = DescriptorUid::from("abc");
	let json = serde_json::to_string(&uid).expect("Failed to serialize uid.");

	assert_eq!(json, "\"abc\"");

	let back: DescriptorUid = serde_json::from_str(&json).expect("Failed to parse uid.");

	assert_eq!(back, uid);
	assert_eq!(DescriptorUid::from(7_u64).as_str(), "7");
}

#[test]
fn memory_factory_builds_descriptors() {
	let created = MemoryDescriptorFactory.create(DescriptorUid::from("x"), vec![1.0, 2.0]);

	assert_eq!(created.uid().as_str(), "x");
	assert_eq!(created.vector(), &[1.0, 2.0]);
}

#[test]
fn closures_act_as_factories() {
	let calls = AtomicUsize::new(0);
	let factory = |uid: DescriptorUid, vector: Vec<f32>| {
		calls.fetch_add(1, Ordering::SeqCst);

		DescriptorRef::new(MemoryDescriptor::new(uid, vector))
	};
	let created = factory.create(DescriptorUid::from("y"), vec![3.0]);

	assert_eq!(created.vector(), &[3.0]);
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn euclidean_distance_requires_matching_dimensions() {
	assert_eq!(distance::euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]), Some(5.0));
	assert_eq!(distance::euclidean_distance(&[0.0], &[3.0, 4.0]), None);
}

#[test]
fn nearest_and_mean_distance_skip_mismatched_anchors() {
	let anchors: [&[f32]; 3] = [&[0.0], &[2.0], &[1.0, 1.0]];

	assert_eq!(distance::nearest_distance(&[5.0], anchors.iter().copied()), Some(3.0));
	assert_eq!(distance::mean_distance(&[5.0], anchors.iter().copied()), Some(4.0));
	assert_eq!(distance::nearest_distance(&[5.0, 5.0, 5.0], anchors.iter().copied()), None);
}

#[test]
fn centroid_averages_vectors() {
	let vectors: [&[f32]; 2] = [&[0.0, 2.0], &[2.0, 4.0]];

	assert_eq!(distance::centroid(vectors), Some(vec![1.0, 3.0]));
	assert_eq!(distance::centroid(Vec::<&[f32]>::new()), None);

	let mismatched: [&[f32]; 2] = [&[0.0], &[1.0, 2.0]];

	assert_eq!(distance::centroid(mismatched), None);
}

#[test]
fn working_set_is_additive_and_ordered() {
	let mut working_set = WorkingSet::new();

	assert!(working_set.is_empty());
	assert!(working_set.add(descriptor(3, &[3.0])));
	assert!(!working_set.add(descriptor(3, &[30.0])));
	assert_eq!(
		working_set.add_many(vec![descriptor(1, &[1.0]), descriptor(3, &[3.0]), descriptor(2, &[2.0])]),
		2
	);

	let uids: Vec<&str> = working_set.uids().map(DescriptorUid::as_str).collect();

	assert_eq!(uids, vec!["3", "1", "2"]);
	assert_eq!(working_set.len(), 3);
	assert_eq!(
		working_set.get(&DescriptorUid::from(3_u64)).map(|d| d.vector().to_vec()),
		Some(vec![3.0])
	);

	working_set.clear();

	assert!(working_set.is_empty());
	assert!(!working_set.contains(&DescriptorUid::from(1_u64)));
}
