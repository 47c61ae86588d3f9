//! Single-writer behavior under concurrent updates.

use std::sync::Arc;
use std::thread;

use serde_json::json;

use confgate::storage::InMemoryStorage;
use confgate::{Configurator, PropertyNode, Schema, Selector, ValueKind};

const WRITERS: usize = 8;
const ROUNDS: i64 = 50;

fn configurator() -> Arc<Configurator> {
    let mut schema = Schema::branch();
    for i in 0..WRITERS {
        schema = schema.child(format!("w{i}"), Schema::leaf(ValueKind::Int).with_default(0i64));
    }
    Arc::new(Configurator::create("load", schema, &json!({}), Arc::new(InMemoryStorage::new())).unwrap())
}

#[test]
fn test_concurrent_sets_all_commit() {
    let configurator = configurator();

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let configurator = configurator.clone();
            thread::spawn(move || {
                let selector = Selector::<i64>::compile(&format!("load.w{i}")).unwrap();
                for n in 1..=ROUNDS {
                    configurator.set_value(&selector, n).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Queued writers never overwrite each other's leaves.
    for i in 0..WRITERS {
        let selector = Selector::<i64>::compile(&format!("load.w{i}")).unwrap();
        assert_eq!(configurator.get(&selector).unwrap(), ROUNDS);
    }
    assert_eq!(configurator.version(), WRITERS as u64 * ROUNDS as u64);
}

#[test]
fn test_readers_see_whole_roots() {
    let configurator = configurator();
    let writer = {
        let configurator = configurator.clone();
        thread::spawn(move || {
            let selector = Selector::<PropertyNode>::compile("load").unwrap();
            for n in 1..=ROUNDS {
                let all: serde_json::Map<_, _> =
                    (0..WRITERS).map(|i| (format!("w{i}"), json!(n))).collect();
                configurator.set(&selector, &serde_json::Value::Object(all)).unwrap();
            }
        })
    };

    // Every leaf is written in the same commit, so a snapshot is never mixed.
    while !writer.is_finished() {
        let root = configurator.root().to_json();
        let first = root["w0"].clone();
        for i in 1..WRITERS {
            assert_eq!(root[format!("w{i}")], first);
        }
    }
    writer.join().unwrap();
}
