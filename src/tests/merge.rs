//! Inspection of merged rule nodes when one pattern appears repeatedly.

use std::time::Duration;

use crate::tests::fixtures::merging_policy;
use crate::types::ParamValue;
use crate::Acl;

#[test]
fn test_denied_keys_and_required_union() {
    let acl = Acl::new(&[merging_policy()]).unwrap();
    let node = acl.merged_permissions("foo/bar").unwrap();

    assert!(node.allowed_parameters.is_empty());
    assert_eq!(node.denied_parameters.len(), 2);
    assert_eq!(node.denied_parameters["baz"], Vec::<ParamValue>::new());
    assert_eq!(node.denied_parameters["zip"], Vec::<ParamValue>::new());
    assert_eq!(
        node.required_parameters.iter().collect::<Vec<_>>(),
        ["baz"]
    );
}

#[test]
fn test_wrapping_ttls_tighten_to_narrowest_window() {
    let acl = Acl::new(&[merging_policy()]).unwrap();
    let node = acl.merged_permissions("hello/universe").unwrap();

    assert_eq!(node.min_wrapping_ttl, Duration::from_secs(100));
    assert_eq!(node.max_wrapping_ttl, Duration::from_secs(200));
    assert_eq!(node.allowed_parameters.len(), 2);
    assert_eq!(
        node.required_parameters.iter().collect::<Vec<_>>(),
        ["bar", "foo"]
    );
}

#[test]
fn test_wildcard_key_joins_specific_keys_in_either_order() {
    let acl = Acl::new(&[merging_policy()]).unwrap();

    for path in ["allow/all", "allow/all1"] {
        let node = acl.merged_permissions(path).unwrap();
        assert_eq!(node.allowed_parameters.len(), 3, "at {path}");
        assert_eq!(node.allowed_parameters["*"], Vec::<ParamValue>::new());
        assert_eq!(node.allowed_parameters["test"], Vec::<ParamValue>::new());
        assert_eq!(node.allowed_parameters["test1"], vec!["foo".into()]);
    }

    for path in ["deny/all", "deny/all1"] {
        let node = acl.merged_permissions(path).unwrap();
        assert_eq!(node.denied_parameters.len(), 2, "at {path}");
        assert_eq!(node.denied_parameters["*"], Vec::<ParamValue>::new());
        assert_eq!(node.denied_parameters["test"], Vec::<ParamValue>::new());
    }
}

#[test]
fn test_value_lists_union_without_duplicates() {
    let acl = Acl::new(&[merging_policy()]).unwrap();
    let node = acl.merged_permissions("value/merge").unwrap();

    let expected: Vec<ParamValue> = vec![1.into(), 2.into(), 3.into(), 4.into()];
    assert_eq!(node.allowed_parameters["test"], expected);
    assert_eq!(node.denied_parameters["test"], expected);
}

#[test]
fn test_empty_value_list_absorbs_specific_values() {
    let acl = Acl::new(&[merging_policy()]).unwrap();
    let node = acl.merged_permissions("value/empty").unwrap();

    assert_eq!(node.allowed_parameters["empty"], Vec::<ParamValue>::new());
    assert_eq!(node.denied_parameters["empty"], Vec::<ParamValue>::new());
}
