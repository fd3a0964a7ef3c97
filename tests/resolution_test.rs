//! Resolution scenarios against a scripted detector
//!
//! These tests drive the full resolver (tree building, detection, closure
//! checks and plan assembly) with `MockDetector` and `InMemoryCatalog`, so no
//! buildpack processes are involved.

use buildpack_detector::detect::{
    BuildpackRef, CompositeBuildpack, ConfigurationError, DetectStrategy, DetectionOutcome,
    Disqualification, ExecutionContext, Group, GroupResolver, InMemoryCatalog, MemberStatus,
    MockDetection, MockDetector, Order, Requirement, ResolutionResult,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use yare::parameterized;

fn bp(id: &str) -> BuildpackRef {
    BuildpackRef::new(id, "1.0")
}

fn group(members: Vec<BuildpackRef>) -> Group {
    Group::new(members)
}

async fn resolve_with(
    detector: Arc<MockDetector>,
    catalog: InMemoryCatalog,
    strategy: DetectStrategy,
    order: &Order,
) -> Result<ResolutionResult, ConfigurationError> {
    GroupResolver::new(detector, Arc::new(catalog), ExecutionContext::default())
        .with_strategy(strategy)
        .resolve(order)
        .await
}

async fn resolve(detector: Arc<MockDetector>, order: &Order) -> ResolutionResult {
    resolve_with(detector, InMemoryCatalog::new(), DetectStrategy::Sequential, order)
        .await
        .unwrap()
}

#[parameterized(
    sequential = { DetectStrategy::Sequential },
    concurrent = { DetectStrategy::Concurrent },
)]
#[test_macro(tokio::test)]
async fn test_falls_back_to_next_group(strategy: DetectStrategy) {
    let detector = Arc::new(MockDetector::new().failing("x").passing("y").passing("z"));
    let order = Order::new(vec![
        group(vec![bp("x"), bp("y")]),
        group(vec![bp("z")]),
    ]);

    let result = resolve_with(detector, InMemoryCatalog::new(), strategy, &order)
        .await
        .unwrap();

    assert_eq!(result.group().unwrap().ids(), vec!["z"]);
    assert!(result.plan().unwrap().is_empty());
    assert_eq!(
        result.failures(),
        vec![(
            0,
            &Disqualification::RequiredBuildpackFailed { buildpack: bp("x") }
        )]
    );
}

#[tokio::test]
async fn test_failed_optional_provider_leaves_requirement_unsatisfied() {
    let detector = Arc::new(
        MockDetector::new()
            .failing("p")
            .with_outcome("q", DetectionOutcome::pass().requiring(Requirement::new("net"))),
    );
    let order = Order::new(vec![group(vec![bp("p").optional(), bp("q")])]);

    let result = resolve(detector, &order).await;

    assert!(!result.is_success());
    assert_eq!(
        result.trace()[0].disqualified,
        Some(Disqualification::UnsatisfiedRequirement {
            name: "net".into(),
            required_by: bp("q"),
        })
    );
}

#[tokio::test]
async fn test_plan_pairs_requirement_with_provider() {
    let detector = Arc::new(
        MockDetector::new()
            .with_outcome("r", DetectionOutcome::pass().providing("lib"))
            .with_outcome(
                "s",
                DetectionOutcome::pass()
                    .requiring(Requirement::new("lib").with_metadata("version", "2.x")),
            ),
    );
    let order = Order::new(vec![group(vec![bp("r"), bp("s")])]);

    let result = resolve(detector, &order).await;

    let plan = result.plan().unwrap();
    assert_eq!(plan.entries.len(), 1);
    let entry = plan.entry("lib").unwrap();
    assert_eq!(entry.providers, vec![bp("r")]);
    assert_eq!(entry.requires[0].metadata["version"].as_str(), Some("2.x"));
}

#[tokio::test]
async fn test_exhaustion_reports_every_candidate() {
    let detector = Arc::new(MockDetector::new().failing("a").with_error("b", "boom"));
    let order = Order::new(vec![group(vec![bp("a")]), group(vec![bp("b")])]);

    let result = resolve(detector, &order).await;

    assert!(matches!(result, ResolutionResult::Exhausted { .. }));
    assert_eq!(result.trace().len(), 2);
    assert_eq!(
        result.trace()[1].members[0].status,
        MemberStatus::Errored {
            message: "boom".into()
        }
    );
}

#[tokio::test]
async fn test_empty_order_is_exhausted() {
    let detector = Arc::new(MockDetector::new());

    let result = resolve(detector.clone(), &Order::default()).await;

    assert!(!result.is_success());
    assert!(result.trace().is_empty());
    assert!(detector.calls().is_empty());
}

#[tokio::test]
async fn test_first_passing_group_wins_and_later_groups_are_not_detected() {
    let detector = Arc::new(MockDetector::new().passing("a").passing("b"));
    let order = Order::new(vec![group(vec![bp("a")]), group(vec![bp("b")])]);

    let result = resolve(detector.clone(), &order).await;

    assert_eq!(result.group().unwrap().ids(), vec!["a"]);
    assert_eq!(detector.calls(), vec!["a"]);
}

#[tokio::test]
async fn test_group_of_only_failed_optionals_is_disqualified() {
    let detector = Arc::new(MockDetector::new());
    let order = Order::new(vec![group(vec![bp("a").optional(), bp("b").optional()])]);

    let result = resolve(detector, &order).await;

    assert_eq!(
        result.trace()[0].disqualified,
        Some(Disqualification::NoBuildpacks)
    );
}

#[tokio::test]
async fn test_composite_is_flattened_into_winning_sub_group() {
    let detector = Arc::new(MockDetector::new().failing("x").passing("z").passing("app"));
    let catalog = InMemoryCatalog::new().with_composite(
        "meta",
        "1.0",
        CompositeBuildpack::new(Order::new(vec![
            group(vec![bp("x"), bp("y").optional()]),
            group(vec![bp("z")]),
        ])),
    );
    let order = Order::new(vec![group(vec![bp("meta").optional(), bp("app")])]);

    let result = resolve_with(detector, catalog, DetectStrategy::Sequential, &order)
        .await
        .unwrap();

    let winner = result.group().unwrap();
    assert_eq!(winner.ids(), vec!["z", "app"]);
    assert!(winner.buildpacks[0].optional, "optional flag is inherited");
    assert!(!winner.buildpacks[1].optional);

    let meta = &result.trace()[0].members[0];
    assert_eq!(meta.status, MemberStatus::Passed);
    assert_eq!(meta.nested.len(), 2);
    assert!(!meta.nested[0].passed());
    assert!(meta.nested[1].passed());
}

#[tokio::test]
async fn test_composite_declarations_satisfy_children() {
    let detector = Arc::new(
        MockDetector::new()
            .with_outcome("child", DetectionOutcome::pass().requiring(Requirement::new("jdk"))),
    );
    let catalog = InMemoryCatalog::new().with_composite(
        "java",
        "1.0",
        CompositeBuildpack::new(Order::new(vec![group(vec![bp("child")])])).providing("jdk"),
    );
    let order = Order::new(vec![group(vec![bp("java")])]);

    let result = resolve_with(detector, catalog, DetectStrategy::Sequential, &order)
        .await
        .unwrap();

    assert_eq!(result.group().unwrap().ids(), vec!["child"]);
    let entry = result.plan().unwrap().entry("jdk").unwrap();
    assert_eq!(entry.providers, vec![bp("java")]);
}

#[tokio::test]
async fn test_failed_required_composite_disqualifies_group() {
    let detector = Arc::new(MockDetector::new().passing("fallback"));
    let catalog = InMemoryCatalog::new().with_composite(
        "meta",
        "1.0",
        CompositeBuildpack::new(Order::new(vec![group(vec![bp("inner")])])),
    );
    let order = Order::new(vec![
        group(vec![bp("meta")]),
        group(vec![bp("fallback")]),
    ]);

    let result = resolve_with(detector, catalog, DetectStrategy::Sequential, &order)
        .await
        .unwrap();

    assert_eq!(result.group().unwrap().ids(), vec!["fallback"]);
    assert_eq!(result.trace()[0].members[0].status, MemberStatus::Failed);
}

#[tokio::test]
async fn test_duplicate_through_composite_is_rejected_before_detection() {
    let detector = Arc::new(MockDetector::new().passing("z"));
    let catalog = InMemoryCatalog::new().with_composite(
        "meta",
        "1.0",
        CompositeBuildpack::new(Order::new(vec![group(vec![bp("z")])])),
    );
    let order = Order::new(vec![group(vec![bp("meta"), bp("z")])]);

    let err = resolve_with(detector.clone(), catalog, DetectStrategy::Sequential, &order)
        .await
        .unwrap_err();

    assert!(matches!(err, ConfigurationError::DuplicateBuildpack { ref id, .. } if id == "z"));
    assert!(detector.calls().is_empty());
}

#[tokio::test]
async fn test_cycle_is_rejected() {
    let detector = Arc::new(MockDetector::new());
    let catalog = InMemoryCatalog::new()
        .with_composite(
            "a",
            "1.0",
            CompositeBuildpack::new(Order::new(vec![group(vec![bp("b")])])),
        )
        .with_composite(
            "b",
            "1.0",
            CompositeBuildpack::new(Order::new(vec![group(vec![bp("a")])])),
        );
    let order = Order::new(vec![group(vec![bp("a")])]);

    let err = resolve_with(detector, catalog, DetectStrategy::Sequential, &order)
        .await
        .unwrap_err();

    assert!(matches!(err, ConfigurationError::Cycle { .. }));
}

#[tokio::test]
async fn test_empty_composite_order_is_rejected() {
    let detector = Arc::new(MockDetector::new());
    let catalog = InMemoryCatalog::new().with_composite(
        "meta",
        "1.0",
        CompositeBuildpack::new(Order::default()),
    );
    let order = Order::new(vec![group(vec![bp("meta")])]);

    let err = resolve_with(detector, catalog, DetectStrategy::Sequential, &order)
        .await
        .unwrap_err();

    assert_eq!(err, ConfigurationError::EmptyOrder { id: "meta".into() });
}

#[tokio::test]
async fn test_concurrent_strategy_abandons_group_after_required_failure() {
    let detector = Arc::new(
        MockDetector::new()
            .failing("required")
            .with_response(
                "slow",
                MockDetection::outcome(DetectionOutcome::pass()).delayed(Duration::from_secs(30)),
            )
            .passing("next"),
    );
    let order = Order::new(vec![
        group(vec![bp("required"), bp("slow").optional()]),
        group(vec![bp("next")]),
    ]);

    let start = Instant::now();
    let result = resolve_with(
        detector,
        InMemoryCatalog::new(),
        DetectStrategy::Concurrent,
        &order,
    )
    .await
    .unwrap();

    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(result.group().unwrap().ids(), vec!["next"]);
    assert_eq!(result.trace()[0].members[1].status, MemberStatus::Skipped);
}

#[tokio::test]
async fn test_concurrent_strategy_keeps_declared_order() {
    let detector = Arc::new(
        MockDetector::new()
            .with_response(
                "first",
                MockDetection::outcome(DetectionOutcome::pass().providing("a"))
                    .delayed(Duration::from_millis(50)),
            )
            .with_outcome("second", DetectionOutcome::pass().providing("a"))
            .with_outcome("third", DetectionOutcome::pass().requiring(Requirement::new("a"))),
    );
    let order = Order::new(vec![group(vec![bp("first"), bp("second"), bp("third")])]);

    let result = resolve_with(
        detector,
        InMemoryCatalog::new(),
        DetectStrategy::Concurrent,
        &order,
    )
    .await
    .unwrap();

    assert_eq!(result.group().unwrap().ids(), vec!["first", "second", "third"]);
    assert_eq!(
        result.plan().unwrap().entry("a").unwrap().providers,
        vec![bp("first"), bp("second")]
    );
}

#[parameterized(
    sequential = { DetectStrategy::Sequential },
    concurrent = { DetectStrategy::Concurrent },
)]
#[test_macro(tokio::test)]
async fn test_sibling_provides_for_composite_child(strategy: DetectStrategy) {
    let detector = Arc::new(
        MockDetector::new()
            .with_outcome("jdk", DetectionOutcome::pass().providing("jdk"))
            .with_outcome("maven", DetectionOutcome::pass().requiring(Requirement::new("jdk"))),
    );
    let catalog = InMemoryCatalog::new().with_composite(
        "meta",
        "1.0",
        CompositeBuildpack::new(Order::new(vec![group(vec![bp("maven")])])),
    );
    let order = Order::new(vec![group(vec![bp("jdk"), bp("meta")])]);

    let result = resolve_with(detector, catalog, strategy, &order)
        .await
        .unwrap();

    assert_eq!(result.group().unwrap().ids(), vec!["jdk", "maven"]);
    let entry = result.plan().unwrap().entry("jdk").unwrap();
    assert_eq!(entry.providers, vec![bp("jdk")]);
    assert_eq!(entry.requires.len(), 1);
}

#[tokio::test]
async fn test_unprovided_composite_child_requirement_names_the_child() {
    let detector = Arc::new(
        MockDetector::new()
            .with_outcome("maven", DetectionOutcome::pass().requiring(Requirement::new("jdk"))),
    );
    let catalog = InMemoryCatalog::new().with_composite(
        "meta",
        "1.0",
        CompositeBuildpack::new(Order::new(vec![group(vec![bp("maven")])])),
    );
    let order = Order::new(vec![group(vec![bp("meta")])]);

    let result = resolve_with(detector, catalog, DetectStrategy::Sequential, &order)
        .await
        .unwrap();

    assert!(!result.is_success());
    assert_eq!(
        result.failures(),
        vec![(
            0,
            &Disqualification::UnsatisfiedRequirement {
                name: "jdk".into(),
                required_by: bp("maven"),
            }
        )]
    );
    assert_eq!(result.trace()[0].members[0].status, MemberStatus::Passed);
}

#[parameterized(
    sequential = { DetectStrategy::Sequential },
    concurrent = { DetectStrategy::Concurrent },
)]
#[test_macro(tokio::test)]
async fn test_failed_optional_composite_is_dropped(strategy: DetectStrategy) {
    let detector = Arc::new(MockDetector::new().failing("inner").passing("app"));
    let catalog = InMemoryCatalog::new().with_composite(
        "meta",
        "1.0",
        CompositeBuildpack::new(Order::new(vec![group(vec![bp("inner")])])),
    );
    let order = Order::new(vec![group(vec![bp("meta").optional(), bp("app")])]);

    let result = resolve_with(detector, catalog, strategy, &order)
        .await
        .unwrap();

    assert_eq!(result.group().unwrap().ids(), vec!["app"]);
    assert!(result.trace()[0].passed());
    assert_eq!(result.trace()[0].members[0].status, MemberStatus::Failed);
}
