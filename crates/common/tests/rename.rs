//! Integration tests for renaming nodes

mod common;

use ::common::acl::{AclPermission, FILE_NAMESPACE};
use ::common::drive::{Activity, CreateOptions, ErrorKind};

#[test]
fn test_rename() {
    let env = common::setup_test_env();
    let alice = common::alice();
    let root = common::private_root(&env.store, &alice);
    let file = common::put_str(&env.store, &alice, root.id(), "a.txt", "x");
    common::drain(&env.events);

    let renamed = env.store.rename(&alice, file.id(), "b.txt").unwrap();
    assert_eq!(renamed.id(), file.id());
    assert_eq!(renamed.filename(), "b.txt");
    assert!(matches!(
        renamed.latest_activity(),
        Some(Activity::Renamed { from, to, .. }) if from == "a.txt" && to == "b.txt"
    ));
    assert_eq!(env.store.path(&alice, file.id()).unwrap(), "/b.txt");
    assert_eq!(common::drain(&env.events).len(), 1);
}

#[test]
fn test_rename_collision() {
    let env = common::setup_test_env();
    let alice = common::alice();
    let root = common::private_root(&env.store, &alice);
    let a = common::put_str(&env.store, &alice, root.id(), "a.txt", "a");
    common::put_str(&env.store, &alice, root.id(), "b.txt", "b");

    let err = env.store.rename(&alice, a.id(), "b.txt").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(env.store.stat(&alice, a.id()).unwrap().filename(), "a.txt");
}

#[test]
fn test_rename_to_same_name_is_noop() {
    let env = common::setup_test_env();
    let alice = common::alice();
    let root = common::private_root(&env.store, &alice);
    let a = common::put_str(&env.store, &alice, root.id(), "a.txt", "a");
    let same = env.store.rename(&alice, a.id(), "a.txt").unwrap();
    assert_eq!(same.audit_log().len(), a.audit_log().len());
}

#[test]
fn test_same_name_rename_still_checks_permissions() {
    let env = common::setup_test_env();
    let alice = common::alice();
    let bob = common::bob();
    let root = common::private_root(&env.store, &alice);
    let secret = common::put_str(&env.store, &alice, root.id(), "secret.txt", "top secret");

    let err = env
        .store
        .rename(&bob, secret.id(), "secret.txt")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let err = env.store.rename(&alice, root.id(), root.filename()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_rename_root_and_invalid_names() {
    let env = common::setup_test_env();
    let alice = common::alice();
    let root = common::private_root(&env.store, &alice);
    let err = env.store.rename(&alice, root.id(), "other").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let a = common::put_str(&env.store, &alice, root.id(), "a.txt", "a");
    let err = env.store.rename(&alice, a.id(), "a:b").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_rename_resorts_parent() {
    let env = common::setup_test_env();
    let alice = common::alice();
    let root = common::private_root(&env.store, &alice);
    let a = common::put_str(&env.store, &alice, root.id(), "a.txt", "a");
    let b = common::put_str(&env.store, &alice, root.id(), "b.txt", "b");
    assert_eq!(
        env.store.stat(&alice, root.id()).unwrap().entries(),
        &[a.id().clone(), b.id().clone()]
    );

    env.store.rename(&alice, a.id(), "c.txt").unwrap();
    assert_eq!(
        env.store.stat(&alice, root.id()).unwrap().entries(),
        &[b.id().clone(), a.id().clone()]
    );
}

#[test]
fn test_rename_permissions() {
    let env = common::setup_test_env();
    let alice = common::alice();
    let bob = common::bob();
    let root = common::private_root(&env.store, &alice);
    let docs = env
        .store
        .mkdir(&alice, root.id(), "docs", CreateOptions::default())
        .unwrap();

    let err = env.store.rename(&bob, docs.id(), "mine").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    env.acl
        .grant(&bob.id, FILE_NAMESPACE, docs.id().as_str(), AclPermission::Rename)
        .unwrap();
    let renamed = env.store.rename(&bob, docs.id(), "mine").unwrap();
    assert_eq!(renamed.filename(), "mine");
}
