//! Dependency graph between sequencers.

use std::collections::{BTreeSet, HashMap};

use anyhow::Result;

use crate::{
    chain::ChainClient,
    sequencers::{Sequencer, SequencerId},
};

/// A validated set of sequencers with a deterministic execution order.
///
/// The order is topological; among sequencers that are ready at the same time
/// the one registered first runs first.
pub struct DeploymentPlan<C> {
    sequencers: Vec<Box<dyn Sequencer<C>>>,
    order: Vec<usize>,
}

impl<C: ChainClient> DeploymentPlan<C> {
    /// Build a plan, rejecting duplicate identifiers, unknown dependencies and cycles.
    pub fn new(sequencers: Vec<Box<dyn Sequencer<C>>>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(sequencers.len());
        for (position, sequencer) in sequencers.iter().enumerate() {
            if positions.insert(sequencer.id(), position).is_some() {
                anyhow::bail!("Sequencer {} is registered more than once", sequencer.id());
            }
        }

        let mut pending = vec![0usize; sequencers.len()];
        let mut dependents = vec![Vec::new(); sequencers.len()];
        for (position, sequencer) in sequencers.iter().enumerate() {
            for dependency in sequencer.requires() {
                let Some(&dep_position) = positions.get(&dependency) else {
                    anyhow::bail!(
                        "Sequencer {} requires {}, which is not registered",
                        sequencer.id(),
                        dependency
                    );
                };
                pending[position] += 1;
                dependents[dep_position].push(position);
            }
        }

        let mut ready: BTreeSet<usize> = (0..sequencers.len())
            .filter(|&position| pending[position] == 0)
            .collect();
        let mut order = Vec::with_capacity(sequencers.len());

        while let Some(position) = ready.pop_first() {
            order.push(position);
            for &dependent in &dependents[position] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() != sequencers.len() {
            let stuck: Vec<String> = (0..sequencers.len())
                .filter(|&position| pending[position] > 0)
                .map(|position| sequencers[position].id().to_string())
                .collect();
            anyhow::bail!("Dependency cycle between sequencers: {}", stuck.join(", "));
        }

        Ok(Self { sequencers, order })
    }

    /// Sequencer identifiers in execution order.
    pub fn order(&self) -> Vec<SequencerId> {
        self.order
            .iter()
            .map(|&position| self.sequencers[position].id())
            .collect()
    }

    /// Sequencers in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Sequencer<C>> {
        self.order
            .iter()
            .map(|&position| self.sequencers[position].as_ref())
    }

    pub fn len(&self) -> usize {
        self.sequencers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequencers.is_empty()
    }
}

impl<C> std::fmt::Debug for DeploymentPlan<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let order: Vec<_> = self
            .order
            .iter()
            .map(|&position| self.sequencers[position].id())
            .collect();
        f.debug_struct("DeploymentPlan").field("order", &order).finish()
    }
}

#[cfg(test)]
mod tests {
    use futures::{FutureExt, future::BoxFuture};

    use super::*;
    use crate::{
        DeployConfig,
        chain::InMemoryChain,
        sequencers::{GroupOutput, SequencerContext, nation3_sequencers},
    };

    struct Node {
        id: SequencerId,
        requires: Vec<SequencerId>,
    }

    impl Sequencer<InMemoryChain> for Node {
        fn id(&self) -> SequencerId {
            self.id
        }

        fn requires(&self) -> Vec<SequencerId> {
            self.requires.clone()
        }

        fn run<'a>(
            &'a self,
            _ctx: SequencerContext<'a, InMemoryChain>,
        ) -> BoxFuture<'a, Result<GroupOutput>> {
            async { Ok(GroupOutput::default()) }.boxed()
        }
    }

    fn node(id: SequencerId, requires: &[SequencerId]) -> Box<dyn Sequencer<InMemoryChain>> {
        Box::new(Node {
            id,
            requires: requires.to_vec(),
        })
    }

    #[test]
    fn test_default_plan_order() {
        let plan =
            DeploymentPlan::<InMemoryChain>::new(nation3_sequencers(&DeployConfig::default()))
                .unwrap();

        let order: Vec<String> = plan.order().iter().map(ToString::to_string).collect();
        assert_eq!(
            order,
            vec!["token", "escrow", "liquidity", "airdrop-0", "airdrop-1", "passport"]
        );
    }

    #[test]
    fn test_dependencies_run_first_regardless_of_registration() {
        use SequencerId::*;

        let plan = DeploymentPlan::new(vec![
            node(Passport, &[Escrow]),
            node(Escrow, &[Token]),
            node(Token, &[]),
        ])
        .unwrap();

        assert_eq!(plan.order(), vec![Token, Escrow, Passport]);
    }

    #[test]
    fn test_ties_follow_registration_order() {
        use SequencerId::*;

        let plan = DeploymentPlan::new(vec![
            node(Token, &[]),
            node(Airdrop(1), &[Token]),
            node(Airdrop(0), &[Token]),
        ])
        .unwrap();

        assert_eq!(plan.order(), vec![Token, Airdrop(1), Airdrop(0)]);
    }

    #[test]
    fn test_duplicate_is_rejected() {
        let err = DeploymentPlan::new(vec![
            node(SequencerId::Token, &[]),
            node(SequencerId::Token, &[]),
        ])
        .unwrap_err();

        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_unknown_dependency_is_rejected() {
        let err = DeploymentPlan::new(vec![node(SequencerId::Escrow, &[SequencerId::Token])])
            .unwrap_err();

        assert!(err.to_string().contains("not registered"));
    }

    #[test]
    fn test_cycle_is_rejected() {
        use SequencerId::*;

        let err = DeploymentPlan::new(vec![
            node(Token, &[]),
            node(Escrow, &[Token, Passport]),
            node(Passport, &[Escrow]),
        ])
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("cycle"));
        assert!(message.contains("escrow"));
        assert!(message.contains("passport"));
        assert!(!message.contains("token"));
    }

    #[test]
    fn test_empty_plan() {
        let plan = DeploymentPlan::<InMemoryChain>::new(Vec::new()).unwrap();
        assert!(plan.is_empty());
        assert!(plan.order().is_empty());
    }
}
