//! Group resolver
//!
//! Candidates of an order are tried one at a time and the first one that
//! passes wins. Inside a candidate, members are detected in declared order:
//! a failing optional member is dropped, a failing required member ends the
//! candidate without detecting the rest. Composite members pass when their
//! own order resolves, and are replaced by the winning sub-group.
//! Requirements are checked once, on the flattened top-level candidate, so
//! a composite's children may rely on the composite's siblings.

use super::collector::{BuildpackDetector, ExecutionContext, OutcomeCollector};
use super::error::ConfigurationError;
use super::model::Order;
use super::plan::{
    assemble, select_members, select_survivors, winning_group, Contribution, MemberAttempt,
};
use super::report::{CandidateTrace, Disqualification, MemberStatus, MemberTrace, ResolutionResult};
use super::tree::{BuildpackCatalog, TreeGroup, TreeMember, TreeOrder};
use futures_util::future::BoxFuture;
use futures_util::stream::{FuturesOrdered, StreamExt};
use futures_util::FutureExt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// How the members of one candidate group are detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectStrategy {
    /// One member at a time, in declared order
    #[default]
    Sequential,
    /// All members at once; results are still consumed in declared order and
    /// in-flight detections are dropped once a required member fails
    Concurrent,
}

struct OrderResolution {
    winner: Option<Vec<Contribution>>,
    trace: Vec<CandidateTrace>,
}

/// Resolves an [`Order`] to the first group that passes detection.
///
/// Detection is delegated to `D`; composite buildpacks are looked up in the
/// catalog. Build one per order file, then call [`GroupResolver::resolve`].
///
/// ```
/// use buildpack_detector::detect::{
///     BuildpackRef, ExecutionContext, Group, GroupResolver, InMemoryCatalog, MockDetector, Order,
/// };
/// use std::sync::Arc;
///
/// let detector = Arc::new(MockDetector::new().failing("acme/go").passing("acme/node"));
/// let order = Order::new(vec![
///     Group::new(vec![BuildpackRef::new("acme/go", "1.0")]),
///     Group::new(vec![BuildpackRef::new("acme/node", "1.0")]),
/// ]);
/// let resolver = GroupResolver::new(
///     detector,
///     Arc::new(InMemoryCatalog::new()),
///     ExecutionContext::default(),
/// );
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// let result = runtime.block_on(resolver.resolve(&order)).unwrap();
/// assert_eq!(result.group().unwrap().ids(), vec!["acme/node"]);
/// ```
pub struct GroupResolver<D> {
    collector: OutcomeCollector<D>,
    catalog: Arc<dyn BuildpackCatalog>,
    strategy: DetectStrategy,
}

impl<D: BuildpackDetector> GroupResolver<D> {
    pub fn new(detector: D, catalog: Arc<dyn BuildpackCatalog>, context: ExecutionContext) -> Self {
        Self {
            collector: OutcomeCollector::new(detector, context),
            catalog,
            strategy: DetectStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: DetectStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Resolves `order` to a winning group and build plan.
    ///
    /// Exhaustion is returned as [`ResolutionResult::Exhausted`]; only
    /// malformed input is an error, and it is reported before any buildpack
    /// is detected.
    pub async fn resolve(&self, order: &Order) -> Result<ResolutionResult, ConfigurationError> {
        let tree = TreeOrder::build(order, self.catalog.as_ref())?;

        let start = Instant::now();
        info!(
            candidates = tree.groups.len(),
            strategy = ?self.strategy,
            "Starting detection"
        );

        let OrderResolution { winner, trace } = self.resolve_order(&tree, false).await;

        match winner {
            Some(contributions) => {
                let group = winning_group(&contributions);
                let plan = assemble(&contributions);
                info!(
                    group = ?group.ids(),
                    plan_entries = plan.entries.len(),
                    duration_ms = start.elapsed().as_millis(),
                    "Detection complete"
                );
                Ok(ResolutionResult::Success { group, plan, trace })
            }
            None => {
                info!(
                    candidates = trace.len(),
                    duration_ms = start.elapsed().as_millis(),
                    "No buildpack groups passed detection"
                );
                Ok(ResolutionResult::Exhausted { trace })
            }
        }
    }

    /// `nested` orders belong to a composite. Their candidates skip the
    /// requirement check, which runs once on the flattened top-level group.
    fn resolve_order<'a>(
        &'a self,
        order: &'a TreeOrder,
        nested: bool,
    ) -> BoxFuture<'a, OrderResolution> {
        async move {
            let mut trace = Vec::with_capacity(order.groups.len());

            for (index, group) in order.groups.iter().enumerate() {
                let (selection, members) = self.attempt_group(group, nested).await;
                match selection {
                    Ok(contributions) => {
                        debug!(candidate = index, "Group passed");
                        trace.push(CandidateTrace {
                            index,
                            members,
                            disqualified: None,
                        });
                        return OrderResolution {
                            winner: Some(contributions),
                            trace,
                        };
                    }
                    Err(reason) => {
                        debug!(candidate = index, reason = %reason, "Group disqualified");
                        trace.push(CandidateTrace {
                            index,
                            members,
                            disqualified: Some(reason),
                        });
                    }
                }
            }

            OrderResolution {
                winner: None,
                trace,
            }
        }
        .boxed()
    }

    async fn attempt_group(
        &self,
        group: &TreeGroup,
        nested: bool,
    ) -> (Result<Vec<Contribution>, Disqualification>, Vec<MemberTrace>) {
        let mut attempts = Vec::with_capacity(group.members.len());
        let mut traces = Vec::with_capacity(group.members.len());

        match self.strategy {
            DetectStrategy::Sequential => {
                for member in &group.members {
                    let (attempt, trace) = self.attempt_member(member).await;
                    let fatal = attempt.is_required_failure();
                    attempts.push(attempt);
                    traces.push(trace);
                    if fatal {
                        break;
                    }
                }
            }
            DetectStrategy::Concurrent => {
                let mut pending: FuturesOrdered<_> = group
                    .members
                    .iter()
                    .map(|member| self.attempt_member(member))
                    .collect();
                while let Some((attempt, trace)) = pending.next().await {
                    let fatal = attempt.is_required_failure();
                    attempts.push(attempt);
                    traces.push(trace);
                    if fatal {
                        break;
                    }
                }
            }
        }

        for member in &group.members[traces.len()..] {
            traces.push(MemberTrace::skipped(member.buildpack()));
        }

        let selection = if nested {
            select_members(attempts)
        } else {
            select_survivors(attempts)
        };
        (selection, traces)
    }

    async fn attempt_member(&self, member: &TreeMember) -> (MemberAttempt, MemberTrace) {
        match member {
            TreeMember::Leaf(buildpack) => {
                let collected = self.collector.collect(buildpack).await;
                let status = match (&collected.error, collected.passed()) {
                    (Some(message), _) => MemberStatus::Errored {
                        message: message.clone(),
                    },
                    (None, true) => MemberStatus::Passed,
                    (None, false) => MemberStatus::Failed,
                };
                let attempt = if collected.passed() {
                    let outcome = collected.outcome;
                    MemberAttempt::passed(
                        buildpack.clone(),
                        vec![Contribution::new(
                            buildpack.clone(),
                            outcome.requires,
                            outcome.provides,
                        )],
                    )
                } else {
                    MemberAttempt::failed(buildpack.clone())
                };
                let trace = MemberTrace {
                    buildpack: buildpack.clone(),
                    status,
                    nested: Vec::new(),
                };
                (attempt, trace)
            }
            TreeMember::Composite {
                buildpack,
                requires,
                provides,
                order,
            } => {
                debug!(buildpack = %buildpack, "Resolving composite buildpack");
                let resolution = self.resolve_order(order, true).await;

                let (attempt, status) = match resolution.winner {
                    Some(children) => {
                        let mut contributions = Vec::with_capacity(children.len() + 1);
                        if !requires.is_empty() || !provides.is_empty() {
                            contributions.push(Contribution {
                                buildpack: buildpack.clone(),
                                requires: requires.clone(),
                                provides: provides.clone(),
                                in_group: false,
                            });
                        }
                        contributions.extend(children.into_iter().map(|mut child| {
                            child.buildpack.optional |= buildpack.optional;
                            child
                        }));
                        (
                            MemberAttempt::passed(buildpack.clone(), contributions),
                            MemberStatus::Passed,
                        )
                    }
                    None => (MemberAttempt::failed(buildpack.clone()), MemberStatus::Failed),
                };

                let trace = MemberTrace {
                    buildpack: buildpack.clone(),
                    status,
                    nested: resolution.trace,
                };
                (attempt, trace)
            }
        }
    }
}
