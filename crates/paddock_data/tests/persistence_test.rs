//! Integration test for creating, flushing and reloading entities.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use paddock_data::model::{Character, Entity, Horse, User};
use paddock_data::{
    Backend, DataDirector, DataError, DataResult, DataSource, DirectorConfig, EntitySource,
    FlushStats, MemoryDataSource,
};

/// Memory source whose first retrieve times out.
#[derive(Default)]
struct FlakySource {
    inner: MemoryDataSource,
    failed_once: AtomicBool,
}

impl<V: Entity> EntitySource<V> for FlakySource {
    fn retrieve(&self, key: &V::Key) -> DataResult<V> {
        if !self.failed_once.swap(true, Ordering::SeqCst) {
            return Err(DataError::Backend("timeout".to_owned()));
        }
        EntitySource::<V>::retrieve(&self.inner, key)
    }

    fn store(&self, key: &V::Key, value: &V) -> DataResult<()> {
        EntitySource::<V>::store(&self.inner, key, value)
    }

    fn delete(&self, key: &V::Key) -> DataResult<()> {
        EntitySource::<V>::delete(&self.inner, key)
    }
}

impl DataSource for FlakySource {
    fn next_uid(&self, kind: &'static str) -> DataResult<u32> {
        self.inner.next_uid(kind)
    }
}

#[test]
fn test_create_and_flush() {
    let source = Arc::new(MemoryDataSource::new());
    let mut director = DataDirector::new(source.clone(), &DirectorConfig::default());

    let horse = director.create::<Horse>();
    let uid = *horse.key();
    assert_eq!(uid, 1);
    horse.mutable(|horse| horse.name = "Ace".to_owned()).unwrap();

    assert_eq!(director.tick(), FlushStats { flushed: 1, failed: 0 });
    let stored: Horse = source.retrieve(&uid).unwrap();
    assert_eq!(stored.name, "Ace");

    // Clean now; the next tick writes nothing.
    assert_eq!(director.tick(), FlushStats::default());

    assert!(director.delete::<Horse>(&uid));
    assert!(!horse.is_available());
    assert!(EntitySource::<Horse>::retrieve(&*source, &uid).is_err());
}

#[test]
fn test_create_user_rejects_taken_name() {
    let director = DataDirector::new(Arc::new(MemoryDataSource::new()), &DirectorConfig::default());

    assert!(director.create_user("rider").is_available());
    assert!(!director.create_user("rider").is_available());
    assert!(!director.create_user("").is_available());
}

#[test]
fn test_create_user_during_outage_keeps_account() {
    let source = Arc::new(FlakySource::default());
    source
        .inner
        .seed(&User {
            name: "rider".to_owned(),
            character_uid: 7,
            infractions: vec![3],
            ..User::default()
        })
        .unwrap();
    let mut director = DataDirector::new(source.clone(), &DirectorConfig::default());

    assert!(!director.create_user("rider").is_available());
    assert_eq!(director.tick(), FlushStats::default());

    let stored: User = source.inner.retrieve(&"rider".to_owned()).unwrap();
    assert_eq!(stored.character_uid, 7);
    assert_eq!(stored.infractions, vec![3]);

    // Once the store answers again the name is reported as taken.
    assert!(!director.create_user("rider").is_available());
    assert!(director.get::<User>(&"rider".to_owned()).is_available());
}

#[test]
fn test_records_shared_across_threads() {
    let director = DataDirector::new(Arc::new(MemoryDataSource::new()), &DirectorConfig::default());
    let uid = *director.create::<Character>().key();

    let threads: Vec<_> = (0..4)
        .map(|_| {
            let record = director.get::<Character>(&uid);
            std::thread::spawn(move || {
                for _ in 0..250 {
                    record.mutable(|character| character.carrots += 1).unwrap();
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }

    let carrots = director
        .get::<Character>(&uid)
        .immutable(|character| character.carrots)
        .unwrap();
    assert_eq!(carrots, 1000);
}

#[test]
fn test_file_backend_survives_restart() {
    let directory = tempfile::tempdir().unwrap();
    let config = DirectorConfig {
        backend: Backend::File,
        data_path: directory.path().to_path_buf(),
        ..DirectorConfig::default()
    };

    {
        let mut director = DataDirector::from_config(&config).unwrap();
        let character = director.create::<Character>();
        let character_uid = *character.key();
        character.mutable(|character| character.name = "rider".to_owned()).unwrap();

        director
            .create_user("rider")
            .mutable(|user| user.character_uid = character_uid)
            .unwrap();

        let stats = director.terminate().unwrap();
        assert_eq!(stats, FlushStats { flushed: 2, failed: 0 });
    }

    let mut director = DataDirector::from_config(&config).unwrap();
    let character_uid = director
        .get::<User>(&"rider".to_owned())
        .immutable(|user| user.character_uid)
        .unwrap();
    assert_eq!(character_uid, 1);
    assert_eq!(
        director
            .get::<Character>(&character_uid)
            .immutable(|character| character.name.clone())
            .unwrap(),
        "rider"
    );

    // The uid counter was persisted too.
    assert_eq!(*director.create::<Character>().key(), 2);
    director.terminate().unwrap();
}
