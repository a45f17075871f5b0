use std::collections::HashMap;

use keyed_slots::hash_table::{Employee, HashTable, SlotState, TableError};
use keyed_slots::probe::ProbeSequence;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(i64, u8),
    Delete(i64),
}

fn op() -> impl Strategy<Value = Op> {
    // A small key range keeps collisions and tombstone reuse frequent.
    prop_oneof![
        (0i64..40, any::<u8>()).prop_map(|(key, tag)| Op::Insert(key, tag)),
        (0i64..40).prop_map(Op::Delete),
    ]
}

fn record(tag: u8) -> Employee {
    Employee::new(format!("L{tag}"), format!("F{tag}"), format!("2001-01-{:02}", tag % 28 + 1))
}

/// Applies `ops` to both the table and a model map, checking each result against the model.
fn run(capacity: usize, ops: &[Op]) -> Result<(HashTable, HashMap<i64, Employee>), TestCaseError> {
    let mut table: HashTable = HashTable::with_capacity(capacity);
    let mut model: HashMap<i64, Employee> = HashMap::new();
    for op in ops {
        match op {
            Op::Insert(key, tag) => {
                let full: bool = model.len() == table.size() - 1;
                match table.insert(*key, record(*tag)) {
                    Ok(previous) => {
                        prop_assert!(!full);
                        prop_assert_eq!(previous, model.insert(*key, record(*tag)));
                    }
                    Err(err) => {
                        prop_assert!(full);
                        prop_assert_eq!(
                            err,
                            TableError::CapacityExceeded {
                                entries: model.len(),
                                capacity: table.size()
                            }
                        );
                    }
                }
            }
            Op::Delete(key) => match model.remove(key) {
                Some(expected) => prop_assert_eq!(table.delete(*key), Ok(expected)),
                None => prop_assert_eq!(table.delete(*key), Err(TableError::NotFound(*key))),
            },
        }
        prop_assert_eq!(table.count(), model.len());
        prop_assert!(table.count() <= table.size() - 1);
    }
    Ok((table, model))
}

proptest! {
    #[test]
    fn lookups_match_model(capacity in 2usize..24, ops in prop::collection::vec(op(), 0..120)) {
        let (table, model) = run(capacity, &ops)?;
        for key in 0i64..40 {
            match model.get(&key) {
                Some(expected) => prop_assert_eq!(table.lookup(key), Ok(expected)),
                None => prop_assert_eq!(table.lookup(key), Err(TableError::NotFound(key))),
            }
        }
        let mut live: Vec<i64> = table.iter().map(|(key, _)| key).collect();
        live.sort_unstable();
        let mut expected: Vec<i64> = model.keys().copied().collect();
        expected.sort_unstable();
        prop_assert_eq!(live, expected);
    }

    #[test]
    fn live_keys_are_reached_before_an_empty_slot(
        capacity in 2usize..24,
        ops in prop::collection::vec(op(), 0..120),
    ) {
        let (table, model) = run(capacity, &ops)?;
        let dump = table.dump();
        for key in model.keys() {
            let mut reached: bool = false;
            for i in ProbeSequence::new(*key, table.size()) {
                prop_assert_ne!(dump[i].state, SlotState::Empty);
                if dump[i].state == SlotState::InUse && dump[i].key == Some(*key) {
                    reached = true;
                    break;
                }
            }
            prop_assert!(reached);
        }
    }

    #[test]
    fn each_key_occupies_one_slot(capacity in 2usize..24, ops in prop::collection::vec(op(), 0..120)) {
        let (table, _) = run(capacity, &ops)?;
        let mut keys: Vec<i64> = table
            .dump()
            .iter()
            .filter(|view| view.state == SlotState::InUse)
            .filter_map(|view| view.key)
            .collect();
        let total: usize = keys.len();
        keys.sort_unstable();
        keys.dedup();
        prop_assert_eq!(keys.len(), total);
    }

    #[test]
    fn failed_operations_leave_table_untouched(
        capacity in 2usize..16,
        ops in prop::collection::vec(op(), 0..80),
        absent in 40i64..80,
    ) {
        let (mut table, _) = run(capacity, &ops)?;
        let before = table.dump();
        let count: usize = table.count();

        prop_assert_eq!(table.delete(absent), Err(TableError::NotFound(absent)));
        prop_assert_eq!(table.dump(), before.clone());
        prop_assert_eq!(table.count(), count);

        if table.is_full() {
            prop_assert!(table.insert(absent, record(0)).is_err());
            prop_assert_eq!(table.dump(), before);
            prop_assert_eq!(table.count(), count);
        }
    }
}
