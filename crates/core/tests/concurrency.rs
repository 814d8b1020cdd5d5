//! Stress tests for concurrent minting, lookup/remove races, and cross-thread hand-off.

use std::collections::HashSet;
use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use navlock_core::{Decision, LockId, LockRegistry, SlotState};

const THREADS: usize = 50;
const MINTS_PER_THREAD: usize = 20;
const RUNS: usize = 20;

#[test]
fn concurrent_mints_yield_distinct_identifiers() {
	for _ in 0..RUNS {
		let registry = LockRegistry::new();
		let barrier = Barrier::new(THREADS);

		let ids: Vec<LockId> = thread::scope(|s| {
			let handles: Vec<_> = (0..THREADS)
				.map(|_| {
					s.spawn(|| {
						barrier.wait();
						(0..MINTS_PER_THREAD).map(|_| registry.mint().0).collect::<Vec<_>>()
					})
				})
				.collect();
			handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
		});

		let total = THREADS * MINTS_PER_THREAD;
		let unique: HashSet<_> = ids.iter().copied().collect();
		assert_eq!(unique.len(), total, "duplicate identifiers minted");
		assert_eq!(registry.len(), total, "lost registrations");
		assert!(ids.iter().all(|id| registry.contains(*id)));

		let max = ids.iter().map(|id| id.get()).max().unwrap();
		assert_eq!(max, total as u64, "identifiers should be dense from 1");
	}
}

#[test]
fn each_thread_sees_increasing_identifiers() {
	let registry = LockRegistry::new();
	thread::scope(|s| {
		for _ in 0..8 {
			s.spawn(|| {
				let ids: Vec<u64> = (0..200).map(|_| registry.mint().0.get()).collect();
				assert!(ids.windows(2).all(|w| w[0] < w[1]));
			});
		}
	});
	assert_eq!(registry.len(), 1600);
}

#[test]
fn remove_and_lookup_race_serializes() {
	for _ in 0..RUNS {
		let registry = LockRegistry::new();
		let minted: Vec<_> = (0..200).map(|_| registry.mint()).collect();
		let barrier = Barrier::new(2);

		thread::scope(|s| {
			s.spawn(|| {
				barrier.wait();
				for (id, _) in &minted {
					registry.remove(*id);
				}
			});
			s.spawn(|| {
				barrier.wait();
				for (id, slot) in &minted {
					if let Some(found) = registry.lookup(*id) {
						assert!(Arc::ptr_eq(&found, slot), "lookup returned a foreign slot for {id}");
						assert_eq!(found.read(), SlotState::Undecided);
					}
				}
			});
		});

		assert!(registry.is_empty());
		assert!(minted.iter().all(|(id, _)| registry.lookup(*id).is_none()));
	}
}

#[test]
fn responder_thread_delivers_to_waiting_thread() {
	let registry = Arc::new(LockRegistry::new());
	let (tx, rx) = mpsc::channel::<(LockId, Decision)>();

	let responder = {
		let registry = Arc::clone(&registry);
		thread::spawn(move || {
			let mut delivered = 0;
			for (id, decision) in rx {
				if let Some(slot) = registry.lookup(id) {
					slot.write(decision).unwrap();
					delivered += 1;
				}
			}
			delivered
		})
	};

	let waiters: Vec<_> = (0..32)
		.map(|i| {
			let registry = Arc::clone(&registry);
			let tx = tx.clone();
			thread::spawn(move || {
				let (id, slot) = registry.mint();
				let decision = Decision::from(i % 2 == 0);
				tx.send((id, decision)).unwrap();
				let state = slot.wait_timeout(Duration::from_secs(10));
				registry.remove(id);
				assert_eq!(state, SlotState::from(decision));
			})
		})
		.collect();
	drop(tx);

	for waiter in waiters {
		waiter.join().unwrap();
	}
	assert_eq!(responder.join().unwrap(), 32);
	assert!(registry.is_empty());
}

#[test]
fn concurrent_double_write_has_exactly_one_winner() {
	let _ = tracing_subscriber::fmt::try_init();
	for _ in 0..RUNS {
		let registry = LockRegistry::new();
		let (id, slot) = registry.mint();
		let barrier = Barrier::new(4);

		let wins: usize = thread::scope(|s| {
			let handles: Vec<_> = (0..4)
				.map(|i| {
					let registry = &registry;
					let barrier = &barrier;
					s.spawn(move || {
						barrier.wait();
						let found = registry.lookup(id).unwrap();
						usize::from(found.write(Decision::from(i % 2 == 0)).is_ok())
					})
				})
				.collect();
			handles.into_iter().map(|h| h.join().unwrap()).sum()
		});

		assert_eq!(wins, 1);
		assert!(slot.read().is_terminal());
	}
}
