//! Integration tests for deleting nodes and subtrees

mod common;

use std::io::Cursor;

use ::common::blobs::BlobStore;
use ::common::drive::{
    Activity, CreateOptions, DeleteOptions, ErrorKind, Fid, Mode, PutOptions,
};
use ::common::repository::Repository;

#[test]
fn test_delete_missing_is_ok() {
    let env = common::setup_test_env();
    env.store
        .delete(&common::alice(), &Fid::from("nope"), DeleteOptions::default())
        .unwrap();
}

#[test]
fn test_delete_file() {
    let env = common::setup_test_env();
    let alice = common::alice();
    let root = common::private_root(&env.store, &alice);
    let file = common::put_str(&env.store, &alice, root.id(), "a.txt", "one");
    common::put_str(&env.store, &alice, root.id(), "a.txt", "two");
    assert_eq!(env.blobs.len(), 2);

    env.store
        .delete(&alice, file.id(), DeleteOptions::default())
        .unwrap();

    assert!(env.store.nodes().find_by_id(file.id()).unwrap().is_none());
    assert!(env.blobs.is_empty());
    let root = env.store.stat(&alice, root.id()).unwrap();
    assert!(root.entries().is_empty());
    assert!(matches!(
        root.latest_activity(),
        Some(Activity::Deleted { child, .. }) if child == file.id()
    ));
}

#[test]
fn test_delete_non_empty_directory_requires_recursive() {
    let env = common::setup_test_env();
    let alice = common::alice();
    let root = common::private_root(&env.store, &alice);
    let docs = env
        .store
        .mkdir(&alice, root.id(), "docs", CreateOptions::default())
        .unwrap();
    common::put_str(&env.store, &alice, docs.id(), "n.txt", "x");

    let err = env
        .store
        .delete(&alice, docs.id(), DeleteOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(env.store.stat(&alice, root.id()).unwrap().entries().len(), 1);
}

#[test]
fn test_delete_empty_directory() {
    let env = common::setup_test_env();
    let alice = common::alice();
    let root = common::private_root(&env.store, &alice);
    let docs = env
        .store
        .mkdir(&alice, root.id(), "docs", CreateOptions::default())
        .unwrap();
    env.store
        .delete(&alice, docs.id(), DeleteOptions::default())
        .unwrap();
    assert!(env.store.nodes().find_by_id(docs.id()).unwrap().is_none());
}

#[test]
fn test_recursive_delete_of_root() {
    let env = common::setup_test_env();
    let alice = common::alice();
    let root = common::private_root(&env.store, &alice);
    let docs = env
        .store
        .mkdir(&alice, root.id(), "docs", CreateOptions::default())
        .unwrap();
    let note = common::put_str(&env.store, &alice, docs.id(), "n.txt", "x");
    let key = note.content().unwrap().key.clone();
    common::drain(&env.events);

    env.store
        .delete(&alice, root.id(), DeleteOptions::recursive())
        .unwrap();

    for id in [root.id(), docs.id(), note.id()] {
        assert!(env.store.nodes().find_by_id(id).unwrap().is_none());
    }
    assert!(!env.blobs.exists(&key).unwrap());

    let deleted: Vec<Fid> = common::drain(&env.events)
        .into_iter()
        .map(|event| event.node)
        .collect();
    assert_eq!(
        deleted,
        vec![root.id().clone(), docs.id().clone(), note.id().clone()]
    );
}

#[test]
fn test_delete_permissions() {
    let env = common::setup_test_env();
    let alice = common::alice();
    let bob = common::bob();
    let root = common::private_root(&env.store, &alice);
    let file = common::put_str(&env.store, &alice, root.id(), "a.txt", "x");

    let err = env
        .store
        .delete(&bob, file.id(), DeleteOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert!(env.store.nodes().find_by_id(file.id()).unwrap().is_some());
}

#[test]
fn test_parent_write_allows_deleting_foreign_child() {
    let env = common::setup_test_env();
    let alice = common::alice();
    let bob = common::bob();
    let root = common::private_root(&env.store, &alice);
    let dropbox = env
        .store
        .mkdir(
            &alice,
            root.id(),
            "dropbox",
            CreateOptions {
                mode: Some(Mode::OWNER_RW | Mode::OTHER_RW),
                ..Default::default()
            },
        )
        .unwrap();
    let bobs = common::put_str(&env.store, &bob, dropbox.id(), "from-bob.txt", "hi");
    assert_eq!(bobs.owner(), &bob.id);

    env.store
        .delete(&alice, bobs.id(), DeleteOptions::default())
        .unwrap();
    assert!(env.store.nodes().find_by_id(bobs.id()).unwrap().is_none());
}

#[test]
fn test_denied_subtree_leaves_node_detached() {
    let env = common::setup_test_env();
    let alice = common::alice();
    let bob = common::bob();
    let root = common::private_root(&env.store, &alice);
    let shared = env
        .store
        .mkdir(
            &alice,
            root.id(),
            "shared",
            CreateOptions {
                mode: Some(Mode::OWNER_RW | Mode::OTHER_RW),
                ..Default::default()
            },
        )
        .unwrap();
    let inner = env
        .store
        .mkdir(
            &bob,
            shared.id(),
            "bobs",
            CreateOptions {
                mode: Some(Mode::OWNER_RW | Mode::OTHER_READ),
                ..Default::default()
            },
        )
        .unwrap();
    // private to bob, alice can neither read nor delete it
    let secret = env
        .store
        .mkdir(
            &bob,
            inner.id(),
            "secret",
            CreateOptions {
                mode: Some(Mode::OWNER_RW),
                ..Default::default()
            },
        )
        .unwrap();

    let err = env
        .store
        .delete(&alice, shared.id(), DeleteOptions::recursive())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let root = env.store.stat(&alice, root.id()).unwrap();
    assert!(root.entries().is_empty());
    for id in [shared.id(), inner.id(), secret.id()] {
        assert!(env.store.nodes().find_by_id(id).unwrap().is_some());
    }
}

#[test]
fn test_unreadable_child_of_writable_dir_stays_detached() {
    let env = common::setup_test_env();
    let alice = common::alice();
    let bob = common::bob();
    let root = common::private_root(&env.store, &alice);
    let dropbox = env
        .store
        .mkdir(
            &alice,
            root.id(),
            "dropbox",
            CreateOptions {
                mode: Some(Mode::OWNER_RW | Mode::OTHER_RW),
                ..Default::default()
            },
        )
        .unwrap();
    let hidden = env
        .store
        .put(
            &bob,
            dropbox.id(),
            "hidden.txt",
            &mut Cursor::new(b"bob only".to_vec()),
            PutOptions {
                mode: Some(Mode::OWNER_RW),
                ..Default::default()
            },
        )
        .unwrap();

    // alice may delete through the writable parent but cannot read the file,
    //  so the subtree walk refuses it after the detach
    assert!(env.store.can_delete(&hidden, &alice));
    assert!(!env.store.can_read(&hidden, &alice));
    let err = env
        .store
        .delete(&alice, hidden.id(), DeleteOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let dropbox = env.store.stat(&alice, dropbox.id()).unwrap();
    assert!(dropbox.entries().is_empty());
    let left = env.store.nodes().find_by_id(hidden.id()).unwrap().unwrap();
    assert!(env.blobs.exists(&left.content().unwrap().key).unwrap());
}
