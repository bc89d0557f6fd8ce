//! Property-based tests for the command scheduler.
//!
//! These tests use proptest to generate random dependency graphs and verify
//! that the resolution invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::command::{Command, DepKind, Dependency};
    use crate::error::Error;
    use crate::scheduler::order;
    use crate::scheduler::tests::StubOracle;
    use proptest::prelude::*;

    /// Build a batch of `n` commands where command `i` provides snapshot
    /// `s<i>` and requires snapshots provided by lower-numbered commands.
    /// Acyclic by construction, so every batch must resolve.
    fn build_batch(dep_seeds: &[Vec<prop::sample::Index>]) -> Vec<Command> {
        dep_seeds
            .iter()
            .enumerate()
            .map(|(i, seeds)| {
                let mut cmd = Command::new(vec!["echo".to_string(), format!("cmd{}", i)]);
                cmd.provide(DepKind::Snapshot, format!("s{}", i)).unwrap();
                if i > 0 {
                    for seed in seeds {
                        let j = seed.index(i);
                        cmd.require(DepKind::Snapshot, format!("s{}", j)).unwrap();
                    }
                }
                cmd
            })
            .collect()
    }

    /// Index of the command named `cmd<i>` in a rendered order.
    fn position(rendered: &[String], i: usize) -> usize {
        let needle = format!("echo cmd{}", i);
        rendered
            .iter()
            .position(|line| *line == needle)
            .unwrap_or_else(|| panic!("{} missing from schedule", needle))
    }

    proptest! {
        /// Property: every acyclic batch resolves to a permutation of its
        /// input, regardless of input order.
        #[test]
        fn acyclic_batches_resolve_completely(
            dep_seeds in prop::collection::vec(
                prop::collection::vec(any::<prop::sample::Index>(), 0..3),
                1..12,
            )
        ) {
            for reversed in [false, true] {
                let mut batch = build_batch(&dep_seeds);
                if reversed {
                    batch.reverse();
                }
                let mut expected: Vec<String> =
                    batch.iter().map(Command::to_string).collect();
                expected.sort();

                let ordered = order(batch, &StubOracle::empty()).unwrap();
                let mut rendered: Vec<String> =
                    ordered.iter().map(Command::to_string).collect();
                rendered.sort();
                prop_assert_eq!(rendered, expected);
            }
        }

        /// Property: a provider always precedes its dependents in the
        /// resolved order.
        #[test]
        fn providers_precede_dependents(
            dep_seeds in prop::collection::vec(
                prop::collection::vec(any::<prop::sample::Index>(), 0..3),
                2..12,
            )
        ) {
            let mut batch = build_batch(&dep_seeds);
            // Worst case for the fixed point: longest chains first.
            batch.reverse();
            let ordered = order(batch, &StubOracle::empty()).unwrap();
            let rendered: Vec<String> =
                ordered.iter().map(Command::to_string).collect();

            for (i, seeds) in dep_seeds.iter().enumerate() {
                if i == 0 {
                    continue;
                }
                for seed in seeds {
                    let j = seed.index(i);
                    prop_assert!(
                        position(&rendered, j) < position(&rendered, i),
                        "cmd{} must precede cmd{} in {:?}",
                        j,
                        i,
                        rendered
                    );
                }
            }
        }

        /// Property: resolution is deterministic for identical input.
        #[test]
        fn resolution_is_deterministic(
            dep_seeds in prop::collection::vec(
                prop::collection::vec(any::<prop::sample::Index>(), 0..3),
                1..12,
            )
        ) {
            let batch = build_batch(&dep_seeds);
            let again = batch.clone();
            let first = order(batch, &StubOracle::empty()).unwrap();
            let second = order(again, &StubOracle::empty()).unwrap();
            let render = |cmds: &[Command]| {
                cmds.iter().map(Command::to_string).collect::<Vec<_>>()
            };
            prop_assert_eq!(render(&first), render(&second));
        }

        /// Property: one unsatisfiable requirement fails the whole batch
        /// and names the stuck command.
        #[test]
        fn unsatisfiable_requirement_fails_resolution(
            dep_seeds in prop::collection::vec(
                prop::collection::vec(any::<prop::sample::Index>(), 0..3),
                1..8,
            )
        ) {
            let mut batch = build_batch(&dep_seeds);
            let mut stuck = Command::new(vec!["echo".to_string(), "stuck".to_string()]);
            stuck.require(DepKind::Mirror, "not-anywhere").unwrap();
            batch.push(stuck);

            match order(batch, &StubOracle::empty()) {
                Err(Error::UnresolvedDependencies { commands, missing }) => {
                    prop_assert_eq!(commands, vec!["echo stuck".to_string()]);
                    prop_assert_eq!(missing, vec!["mirror/not-anywhere".to_string()]);
                }
                other => prop_assert!(false, "expected resolution failure, got {:?}", other),
            }
        }

        /// Property: requirements answered by the oracle never block
        /// resolution even when no command provides them.
        #[test]
        fn oracle_satisfied_requirements_do_not_block(
            dep_seeds in prop::collection::vec(
                prop::collection::vec(any::<prop::sample::Index>(), 0..3),
                1..8,
            )
        ) {
            let mut batch = build_batch(&dep_seeds);
            let mut extra = Command::new(vec!["echo".to_string(), "extra".to_string()]);
            extra.require(DepKind::Mirror, "pre-existing").unwrap();
            batch.insert(0, extra);

            let oracle = StubOracle::with(vec![Dependency::new(
                DepKind::Mirror,
                "pre-existing",
            )]);
            let ordered = order(batch, &oracle).unwrap();
            // The oracle-satisfied command has no in-batch blockers, so it
            // keeps its slot at the front.
            prop_assert_eq!(ordered[0].to_string(), "echo extra");
        }
    }
}
