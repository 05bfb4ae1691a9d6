//! Shared test utilities for drive integration tests
#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use common::acl::StaticAcl;
use common::blobs::{FsBlobStore, MemoryBlobStore};
use common::drive::{
    DriveStore, Fid, File, NamedRoot, OpenOptions, PutOptions, Subject, UserRoots,
};
use common::events::{ChannelPublisher, DomainEvent};
use common::repository::FsRepository;

pub struct TestEnv {
    pub store: DriveStore,
    pub blobs: MemoryBlobStore,
    pub acl: Arc<StaticAcl>,
    pub events: flume::Receiver<DomainEvent>,
}

/// Route library logs to the test harness, honoring `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Set up an in-memory store with a grantable ACL and a captured event stream
pub fn setup_test_env() -> TestEnv {
    init_tracing();
    let blobs = MemoryBlobStore::new();
    let acl = Arc::new(StaticAcl::new());
    let (publisher, events) = ChannelPublisher::new();
    let store = DriveStore::builder()
        .blobs(Arc::new(blobs.clone()))
        .acl(acl.clone())
        .events(Arc::new(publisher))
        .build();
    TestEnv {
        store,
        blobs,
        acl,
        events,
    }
}

/// A store persisted below `dir`, laid out like the CLI's data directory
pub fn open_fs_store(dir: &Path) -> DriveStore {
    DriveStore::builder()
        .nodes(Arc::new(FsRepository::<File>::open(dir.join("nodes")).unwrap()))
        .named_roots(Arc::new(
            FsRepository::<NamedRoot>::open(dir.join("roots").join("global")).unwrap(),
        ))
        .user_roots(Arc::new(
            FsRepository::<UserRoots>::open(dir.join("roots").join("private")).unwrap(),
        ))
        .blobs(Arc::new(FsBlobStore::open(dir.join("blobs")).unwrap()))
        .build()
}

pub fn alice() -> Subject {
    Subject::user("alice")
}

pub fn bob() -> Subject {
    Subject::user("bob")
}

pub fn root_user() -> Subject {
    Subject::superuser("root")
}

/// Alice's private root, created on first use
pub fn private_root(store: &DriveStore, subject: &Subject) -> File {
    store
        .open_root(subject, OpenOptions::private(subject.id.clone()).create(true))
        .unwrap()
}

pub fn put_str(store: &DriveStore, subject: &Subject, parent: &Fid, name: &str, data: &str) -> File {
    store
        .put(
            subject,
            parent,
            name,
            &mut Cursor::new(data.as_bytes().to_vec()),
            PutOptions::default(),
        )
        .unwrap()
}

pub fn read_all(store: &DriveStore, subject: &Subject, fid: &Fid) -> String {
    let mut out = Vec::new();
    store.get(subject, fid).unwrap().transfer(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

pub fn drain(events: &flume::Receiver<DomainEvent>) -> Vec<DomainEvent> {
    events.try_iter().collect()
}
