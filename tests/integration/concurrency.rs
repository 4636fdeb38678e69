//! One kernel shared across threads

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use crate::common::*;
use serde_json::json;

const THREADS: usize = 8;

#[test]
fn concurrent_declarations_get_distinct_ids() {
    let (kernel, store) = kernel();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let kernel = kernel.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                entity(&kernel, "load", &format!("e{}", i))
            })
        })
        .collect();

    let ids: HashSet<_> = handles
        .into_iter()
        .map(|h| h.join().unwrap().id.unwrap())
        .collect();
    assert_eq!(ids.len(), THREADS);
    assert_eq!(store.stats().entities, THREADS);
}

#[test]
fn concurrent_instances_keep_their_values() {
    let (kernel, store) = kernel();
    let counter = entity(&kernel, "", "counter");
    let value = attribute(&kernel, &counter, "value", AttributeType::Integer, None);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let kernel = kernel.clone();
            let counter = counter.clone();
            let value = value.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                instance(&kernel, &counter, &[(&value, json!(i))])
            })
        })
        .collect();

    for handle in handles {
        let created = handle.join().unwrap();
        let stored = kernel
            .instances()
            .find_by_id(created.id.unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(stored.value_of("value"), created.value_of("value"));
    }
    assert_eq!(store.stats().instances, THREADS);
    assert_eq!(store.stats().values, THREADS);
    assert_eq!(store.transaction_depth(), 0);
}

#[test]
fn failed_transactions_leave_other_threads_writes_alone() {
    let (kernel, store) = kernel();
    let node = entity(&kernel, "", "node");
    let label = attribute(&kernel, &node, "label", AttributeType::Text, None);
    let links = kernel
        .relation_types()
        .create(
            &RelationType::new("links", node.to_ref(), node.to_ref())
                .with_cardinalities(Cardinality::Many, Cardinality::Many),
        )
        .unwrap();
    let a = instance(&kernel, &node, &[(&label, json!("a"))]);
    let b = instance(&kernel, &node, &[(&label, json!("b"))]);
    for _ in 0..3 {
        kernel
            .relations()
            .create(&Relation::new(links.id.unwrap(), a.to_ref(), b.to_ref()))
            .unwrap();
    }

    // A stale version prunes inside the transaction, then fails and rolls back
    let mut stale = links.clone();
    stale.version = Some(99);
    stale.source_cardinality = Some(Cardinality::One);
    stale.target_cardinality = Some(Cardinality::One);

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let kernel = kernel.clone();
            let node = node.clone();
            let label = label.clone();
            let stale = stale.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                if i % 2 == 0 {
                    let err = kernel.relation_types().update(&stale).unwrap_err();
                    assert_eq!(err.kind(), ErrorKind::Conflict);
                    None
                } else {
                    Some(instance(&kernel, &node, &[(&label, json!(format!("n{}", i)))]))
                }
            })
        })
        .collect();

    let created: Vec<Instance> = handles
        .into_iter()
        .filter_map(|h| h.join().unwrap())
        .collect();
    assert_eq!(created.len(), THREADS / 2);
    for instance in &created {
        let stored = kernel
            .instances()
            .find_by_id(instance.id.unwrap())
            .unwrap()
            .expect("committed instance survives other rollbacks");
        assert_eq!(stored.value_of("label"), instance.value_of("label"));
    }
    assert_eq!(store.stats().instances, 2 + THREADS / 2);
    assert_eq!(kernel.relations().list_all().unwrap().len(), 3);
    assert_eq!(
        kernel.relation_types().find_by_id(links.id.unwrap()).unwrap().unwrap().version,
        Some(1)
    );
    assert_eq!(store.transaction_depth(), 0);
}
