//! Most-specific-match selection between competing wildcard rules.
//!
//! Each case grants `update` on the pattern expected to win and `read` on
//! the pattern expected to lose, then probes one path both patterns match.

use yare::parameterized;

use crate::{Acl, AclRequest, Operation, PathRule, Policy};

fn acl_with(winner: &str, loser: &str) -> Acl {
    let policy = Policy::new("priority")
        .with_path(PathRule::new(winner).with_capabilities(["update"]))
        .with_path(PathRule::new(loser).with_capabilities(["read"]));
    Acl::new(&[policy]).unwrap()
}

#[parameterized(
    segment_beats_bare_glob = { "+/*", "*", "foo/bar/bar/baz" },
    later_wildcard_beats_earlier = { "foo/+/*", "+/*", "foo/bar/bar/baz" },
    fewer_wildcards_beat_more = { "foo/+/bar/baz", "foo/+/+/*", "foo/bar/bar/baz" },
    fewer_wildcards_beat_more_same_shape = { "foo/+/bar/baz", "foo/+/+/baz", "foo/bar/bar/baz" },
    longer_literal_run_wins = { "foo/(ar/+/baz", "foo/+/(ar/baz", "foo/(ar/(ar/baz" },
    exact_tail_beats_glob_tail = { "foo/bar/+/baz", "foo/bar/+/baz*", "foo/bar/bar/baz" },
    longer_glob_tail_wins = { "foo/bar/+/ba*", "foo/bar/+/b*", "foo/bar/bar/baz" },
)]
fn test_more_specific_pattern_wins(winner: &str, loser: &str, path: &str) {
    let acl = acl_with(winner, loser);

    assert!(
        acl.allow_operation(&AclRequest::new(Operation::Update, path))
            .is_allowed(),
        "expected {winner} to win on {path}"
    );
    assert!(
        !acl.allow_operation(&AclRequest::new(Operation::Read, path))
            .is_allowed(),
        "expected {loser} to lose on {path}"
    );
}

#[test]
fn test_prefix_wins_only_on_strictly_longer_literal() {
    // "1/2/" and "1/2/+" carry the same leading literal; the segment rule
    // takes the tie because it also constrains the segment count.
    let policy = Policy::new("priority")
        .with_path(PathRule::new("1/2/*").with_capabilities(["create"]))
        .with_path(PathRule::new("1/2/+").with_capabilities(["read"]));
    let acl = Acl::new(&[policy]).unwrap();

    assert!(acl.allowed(Operation::Read, "1/2/3"));
    assert!(!acl.allowed(Operation::Create, "1/2/3"));
    // One segment too many for the wildcard rule; the prefix still applies.
    assert!(acl.allowed(Operation::Create, "1/2/3/4"));

    // A strictly longer prefix literal beats the segment rule.
    let policy = Policy::new("priority")
        .with_path(PathRule::new("1/2/3*").with_capabilities(["create"]))
        .with_path(PathRule::new("1/2/+").with_capabilities(["read"]));
    let acl = Acl::new(&[policy]).unwrap();
    assert!(acl.allowed(Operation::Create, "1/2/3"));
    assert!(!acl.allowed(Operation::Read, "1/2/3"));
}

#[test]
fn test_exact_match_always_wins() {
    let policy = Policy::new("priority")
        .with_path(PathRule::new("kv/+").with_capabilities(["read"]))
        .with_path(PathRule::new("kv/*").with_capabilities(["read"]))
        .with_path(PathRule::new("kv/pin").with_capabilities(["update"]));
    let acl = Acl::new(&[policy]).unwrap();

    assert!(acl.allowed(Operation::Update, "kv/pin"));
    assert!(!acl.allowed(Operation::Read, "kv/pin"));
    assert!(acl.allowed(Operation::Read, "kv/other"));
}
