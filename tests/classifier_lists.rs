//! Allow/deny list classification over real error types.
use retrier::{
    Action, AllowListClassifier, Classifier, Criterion, DefaultClassifier, DenyListClassifier,
    ExtendableClassifier, FnClassifier,
};
use std::io;
use std::sync::Arc;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
enum DbError {
    #[error("deadlock detected")]
    Deadlock,
    #[error("connection reset")]
    Reset(#[source] IoKind),
    #[error("constraint {0} violated")]
    Constraint(&'static str),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("io kind {0:?}")]
struct IoKind(io::ErrorKind);

#[derive(thiserror::Error, Debug)]
#[error("query failed")]
struct QueryError(#[source] DbError);

#[test]
fn success_is_succeed_for_every_classifier() {
    let allow = AllowListClassifier::new([Criterion::of_type::<DbError>()]);
    let deny = DenyListClassifier::new([Criterion::of_type::<DbError>()]);
    let none: Option<DenyListClassifier> = None;

    assert_eq!(Classifier::<DbError>::classify(&DefaultClassifier, None), Action::Succeed);
    assert_eq!(Classifier::<DbError>::classify(&allow, None), Action::Succeed);
    assert_eq!(Classifier::<DbError>::classify(&deny, None), Action::Succeed);
    assert_eq!(Classifier::<DbError>::classify(&none, None), Action::Succeed);
}

#[test]
fn allow_and_deny_are_mirror_images() {
    let criteria = || {
        [
            Criterion::sentinel(DbError::Deadlock),
            Criterion::when(|e: &DbError| {
                matches!(e, DbError::Constraint(name) if name.starts_with("tmp_"))
            }),
        ]
    };
    let allow = AllowListClassifier::new(criteria());
    let deny = DenyListClassifier::new(criteria());

    let cases = [
        (DbError::Deadlock, true),
        (DbError::Constraint("tmp_lock"), true),
        (DbError::Constraint("pk_users"), false),
        (DbError::Reset(IoKind(io::ErrorKind::ConnectionReset)), false),
    ];
    for (err, listed) in cases {
        let (on_allow, on_deny) = if listed {
            (Action::Retry, Action::Fail)
        } else {
            (Action::Fail, Action::Retry)
        };
        assert_eq!(allow.classify(Some(&err)), on_allow, "allow list on {err:?}");
        assert_eq!(deny.classify(Some(&err)), on_deny, "deny list on {err:?}");
    }
}

#[test]
fn criteria_match_through_source_chain() {
    let allow =
        AllowListClassifier::new([Criterion::sentinel(IoKind(io::ErrorKind::ConnectionReset))]);

    let direct = DbError::Reset(IoKind(io::ErrorKind::ConnectionReset));
    let nested = QueryError(direct.clone());
    let other = QueryError(DbError::Reset(IoKind(io::ErrorKind::BrokenPipe)));

    assert_eq!(allow.classify(Some(&direct)), Action::Retry);
    assert_eq!(allow.classify(Some(&nested)), Action::Retry);
    assert_eq!(allow.classify(Some(&other)), Action::Fail);
}

#[test]
fn io_kind_criteria_classify_io_errors() {
    let deny = DenyListClassifier::new([
        Criterion::io_kind(io::ErrorKind::PermissionDenied),
        Criterion::io_kind(io::ErrorKind::NotFound),
    ]);
    let denied = io::Error::from(io::ErrorKind::PermissionDenied);
    let timed_out = io::Error::new(io::ErrorKind::TimedOut, "slow peer");

    assert_eq!(deny.classify(Some(&denied)), Action::Fail);
    assert_eq!(deny.classify(Some(&timed_out)), Action::Retry);
}

#[test]
fn appends_are_visible_to_shared_handles() {
    let deny = DenyListClassifier::default();
    let shared: Arc<dyn Classifier<DbError>> = Arc::new(deny.clone());
    let err = DbError::Constraint("fk_orders");

    assert!(deny.is_empty());
    assert_eq!(shared.classify(Some(&err)), Action::Retry);

    deny.append(Criterion::custom("constraint violations", |e: &(dyn std::error::Error + 'static)| {
        matches!(e.downcast_ref::<DbError>(), Some(DbError::Constraint(_)))
    }));
    assert_eq!(deny.len(), 1);
    assert_eq!(shared.classify(Some(&err)), Action::Fail);
}

#[test]
fn concurrent_append_and_classify() {
    let allow = AllowListClassifier::default();
    let err = DbError::Deadlock;

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..250 {
                    allow.append(Criterion::sentinel(DbError::Constraint("x")));
                }
            });
            scope.spawn(|| {
                for _ in 0..250 {
                    assert_eq!(allow.classify(Some(&err)), Action::Fail);
                }
            });
        }
    });

    assert_eq!(allow.len(), 1_000);
    allow.append(Criterion::sentinel(DbError::Deadlock));
    assert_eq!(allow.classify(Some(&err)), Action::Retry);
}

#[test]
fn closures_act_as_classifiers() {
    let classifier = FnClassifier::new(|outcome: Option<&DbError>| match outcome {
        None => Action::Succeed,
        Some(DbError::Deadlock) => Action::Retry,
        Some(_) => Action::Fail,
    });

    assert_eq!(classifier.classify(None), Action::Succeed);
    assert_eq!(classifier.classify(Some(&DbError::Deadlock)), Action::Retry);
    assert_eq!(classifier.classify(Some(&DbError::Constraint("pk"))), Action::Fail);
}
