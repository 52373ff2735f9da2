//! Integration test for the director's load graphs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use paddock_data::model::{
    Character, Egg, Entity, Guild, Horse, Housing, Infraction, Item, Mail, Mailbox, Pet,
    Settings, StorageItem, User,
};
use paddock_data::{
    wire, DataDirector, DataError, DataResult, DataSource, DirectorConfig, EntitySource,
    LoadState, MemoryDataSource,
};

/// Memory source counting retrieves.
#[derive(Default)]
struct CountingSource {
    inner: MemoryDataSource,
    retrieves: AtomicUsize,
}

impl<V: Entity> EntitySource<V> for CountingSource {
    fn retrieve(&self, key: &V::Key) -> DataResult<V> {
        self.retrieves.fetch_add(1, Ordering::SeqCst);
        EntitySource::<V>::retrieve(&self.inner, key)
    }

    fn store(&self, key: &V::Key, value: &V) -> DataResult<()> {
        EntitySource::<V>::store(&self.inner, key, value)
    }

    fn delete(&self, key: &V::Key) -> DataResult<()> {
        EntitySource::<V>::delete(&self.inner, key)
    }
}

impl DataSource for CountingSource {
    fn next_uid(&self, kind: &'static str) -> DataResult<u32> {
        self.inner.next_uid(kind)
    }
}

/// Source whose backend is always down.
struct OfflineSource;

impl<V: Entity> EntitySource<V> for OfflineSource {
    fn retrieve(&self, _key: &V::Key) -> DataResult<V> {
        Err(DataError::Backend("connection refused".to_owned()))
    }

    fn store(&self, _key: &V::Key, _value: &V) -> DataResult<()> {
        Err(DataError::Backend("connection refused".to_owned()))
    }

    fn delete(&self, _key: &V::Key) -> DataResult<()> {
        Err(DataError::Backend("connection refused".to_owned()))
    }
}

impl DataSource for OfflineSource {
    fn next_uid(&self, _kind: &'static str) -> DataResult<u32> {
        Err(DataError::Backend("connection refused".to_owned()))
    }
}

fn director_over(source: Arc<dyn DataSource>) -> DataDirector {
    DataDirector::new(source, &DirectorConfig::default())
}

/// Seeds a character with one of everything.
fn seed_character_graph(source: &MemoryDataSource) {
    source
        .seed(&User {
            name: "rider".to_owned(),
            character_uid: 1,
            infractions: vec![1],
            ..User::default()
        })
        .unwrap();
    source
        .seed(&Infraction { uid: 1, description: "spam".to_owned(), ..Infraction::default() })
        .unwrap();

    source
        .seed(&Character {
            uid: 1,
            name: "rider".to_owned(),
            guild_uid: 1,
            pet_uid: 1,
            settings_uid: 1,
            gifts: vec![1],
            purchases: vec![2],
            inventory: vec![12],
            character_equipment: vec![13],
            mount_equipment: vec![14],
            horses: vec![2],
            mount_uid: 1,
            eggs: vec![1],
            pets: vec![1],
            housing: vec![1],
            mailbox: Mailbox { inbox: vec![1], sent: vec![2] },
            ..Character::default()
        })
        .unwrap();

    source.seed(&Guild { uid: 1, name: "Stable".to_owned(), owner: 1, ..Guild::default() }).unwrap();
    source.seed(&Pet { uid: 1, name: "cat".to_owned(), ..Pet::default() }).unwrap();
    source.seed(&Settings { uid: 1, ..Settings::default() }).unwrap();
    source.seed(&StorageItem { uid: 1, items: vec![10], ..StorageItem::default() }).unwrap();
    source.seed(&StorageItem { uid: 2, items: vec![11], ..StorageItem::default() }).unwrap();
    for uid in 10..=14 {
        source.seed(&Item { uid, tid: 40_000 + uid, count: 1, expires_at: 0 }).unwrap();
    }

    // Mount 1 descends from 3 (known) and 4 (lost); 3 descends from 5.
    source
        .seed(&Horse { uid: 1, name: "Ace".to_owned(), ancestors: vec![3, 4], ..Horse::default() })
        .unwrap();
    source.seed(&Horse { uid: 2, name: "Bolt".to_owned(), ..Horse::default() }).unwrap();
    source.seed(&Horse { uid: 3, ancestors: vec![5], ..Horse::default() }).unwrap();
    source.seed(&Horse { uid: 5, ..Horse::default() }).unwrap();

    source.seed(&Egg { uid: 1, ..Egg::default() }).unwrap();
    source.seed(&Housing { uid: 1, ..Housing::default() }).unwrap();
    source.seed(&Mail { uid: 1, subject: "hello".to_owned(), ..Mail::default() }).unwrap();
    source.seed(&Mail { uid: 2, subject: "re: hello".to_owned(), ..Mail::default() }).unwrap();
}

#[test]
fn test_cache_then_hit() {
    let source = Arc::new(CountingSource::default());
    source.inner.seed(&Horse { uid: 1, ..Horse::default() }).unwrap();
    let director = director_over(source.clone());

    let first = director.get::<Horse>(&1);
    let second = director.get::<Horse>(&1);
    assert!(first.is_available() && second.is_available());
    assert_eq!(source.retrieves.load(Ordering::SeqCst), 1);

    // The sentinel never reaches the backing store.
    assert!(!director.get::<Horse>(&0).is_available());
    assert!(!director.get::<User>(&String::new()).is_available());
    assert_eq!(source.retrieves.load(Ordering::SeqCst), 1);
}

#[test]
fn test_batch_all_or_nothing() {
    let source = Arc::new(MemoryDataSource::new());
    source.seed(&Item { uid: 1, ..Item::default() }).unwrap();
    source.seed(&Item { uid: 2, ..Item::default() }).unwrap();
    let director = director_over(source);

    assert_eq!(director.get_many::<Item>(&[1, 2]).map(|records| records.len()), Some(2));
    assert!(director.get_many::<Item>(&[1, 2, 3]).is_none());
}

#[test]
fn test_unavailable_record_is_hard_error() {
    let director = director_over(Arc::new(MemoryDataSource::new()));
    let missing = director.get::<Horse>(&42);
    assert_eq!(
        missing.mutable(|horse| horse.rating = 1),
        Err(DataError::Unavailable { kind: "horse", key: "42".to_owned() })
    );
}

#[test]
fn test_at_most_one_load_in_flight() {
    let source = Arc::new(MemoryDataSource::new());
    let mut director = director_over(source.clone());

    director.request_load_user_data("rider");
    director.request_load_user_data("rider");
    assert!(director.are_data_being_loaded("rider"));
    assert_eq!(director.pending_tasks(), 1);

    // The user does not exist yet: the attempt is requeued, not duplicated.
    director.tick();
    assert_eq!(director.load_state("rider"), Some(LoadState::Retrying));
    assert_eq!(director.pending_tasks(), 1);
    assert!(director
        .last_debug_message("rider")
        .is_some_and(|message| message.contains("unavailable")));

    source
        .seed(&User { name: "rider".to_owned(), infractions: vec![7], ..User::default() })
        .unwrap();
    director.tick();
    assert_eq!(director.load_state("rider"), Some(LoadState::Retrying));
    assert!(director
        .last_debug_message("rider")
        .is_some_and(|message| message.contains("infractions")));

    source.seed(&Infraction { uid: 7, ..Infraction::default() }).unwrap();
    director.tick();
    assert_eq!(director.load_state("rider"), Some(LoadState::Complete));
    assert!(director.are_user_data_loaded("rider"));
    assert!(!director.are_data_being_loaded("rider"));
    assert_eq!(director.pending_tasks(), 0);

    // Already loaded: nothing is queued.
    director.request_load_user_data("rider");
    assert_eq!(director.pending_tasks(), 0);
}

#[test]
fn test_timeout_with_offline_source() {
    let mut director = director_over(Arc::new(OfflineSource));
    director.set_load_timeout(Duration::from_millis(30));

    director.request_load_user_data("rider");
    for _ in 0..200 {
        if !director.are_data_being_loaded("rider") {
            break;
        }
        director.tick();
        std::thread::sleep(Duration::from_millis(5));
    }

    assert!(!director.are_data_being_loaded("rider"));
    assert!(!director.are_user_data_loaded("rider"));
    assert_eq!(director.load_state("rider"), Some(LoadState::TimedOut));
    assert_eq!(director.pending_tasks(), 0);

    // A timed-out chain can be requested again.
    director.request_load_user_data("rider");
    assert!(director.are_data_being_loaded("rider"));
}

#[test]
fn test_character_graph_load() {
    let source = Arc::new(MemoryDataSource::new());
    seed_character_graph(&source);
    let mut director = director_over(source);

    director.request_load_user_data("rider");
    director.tick();
    assert!(director.are_user_data_loaded("rider"));

    director.request_load_character_data("rider", 1);
    assert!(!director.are_character_data_loaded("rider"));
    director.tick();
    assert!(director.are_character_data_loaded("rider"));
    assert_eq!(director.load_state("rider"), Some(LoadState::Complete));

    let stores = director.stores();
    for uid in [10, 11, 12, 13, 14] {
        assert!(stores.items.contains(&uid), "item {uid} not resident");
    }
    assert!(stores.guilds.contains(&1));
    assert!(stores.settings.contains(&1));
    assert_eq!(stores.mail.len(), 2);
    // Ancestry is warmed two generations deep; the lost parent is skipped.
    assert!(stores.horses.contains(&3));
    assert!(stores.horses.contains(&5));
    assert!(!stores.horses.contains(&4));

    let profile = wire::character_profile(&director, 1).unwrap();
    assert_eq!(profile.character.guild.name, "Stable");
    assert_eq!(profile.mount.name, "Ace");
    let horses = wire::horse_list(&director, 1).unwrap();
    assert_eq!(horses.horses.len(), 2);
    assert_eq!(wire::inventory(&director, 1).unwrap().items.len(), 1);
    assert_eq!(wire::mail_list(&director, 1).unwrap().mails[0].subject, "hello");
}

#[test]
fn test_character_graph_waits_for_required_entities() {
    let source = Arc::new(MemoryDataSource::new());
    seed_character_graph(&source);
    EntitySource::<Mail>::delete(&*source, &2).unwrap();
    let mut director = director_over(source.clone());

    director.request_load_character_data("rider", 1);
    director.tick();
    assert_eq!(director.load_state("rider"), Some(LoadState::Retrying));
    assert!(director
        .last_debug_message("rider")
        .is_some_and(|message| message.contains("sent mail")));

    source.seed(&Mail { uid: 2, ..Mail::default() }).unwrap();
    director.tick();
    assert!(director.are_character_data_loaded("rider"));
}

#[test]
fn test_character_uid_zero_fails_immediately() {
    let mut director = director_over(Arc::new(MemoryDataSource::new()));

    director.request_load_character_data("rider", 0);
    director.tick();

    assert_eq!(director.load_state("rider"), Some(LoadState::Failed));
    assert!(!director.are_data_being_loaded("rider"));
    assert_eq!(director.pending_tasks(), 0);
    assert!(director.forget_user("rider"));
    assert_eq!(director.load_state("rider"), None);
}

#[test]
fn test_character_graph_of_created_entities() {
    let source = Arc::new(CountingSource::default());
    let mut director = director_over(source.clone());

    let guild = director.create::<Guild>();
    guild.mutable(|guild| guild.name = "Stable".to_owned()).unwrap();
    let items: Vec<u32> = (0..3).map(|_| *director.create::<Item>().key()).collect();
    let gift = director.create::<StorageItem>();
    gift.mutable(|gift| gift.items = vec![items[2]]).unwrap();
    let mount = director.create::<Horse>();
    mount.mutable(|horse| horse.name = "Ace".to_owned()).unwrap();
    let pet = *director.create::<Pet>().key();
    let settings = *director.create::<Settings>().key();
    let egg = *director.create::<Egg>().key();
    let housing = *director.create::<Housing>().key();
    let mail = director.create::<Mail>();
    mail.mutable(|mail| mail.subject = "hello".to_owned()).unwrap();

    let character = director.create::<Character>();
    let character_uid = *character.key();
    character
        .mutable(|character| {
            character.name = "rider".to_owned();
            character.guild_uid = *guild.key();
            character.pet_uid = pet;
            character.settings_uid = settings;
            character.gifts = vec![*gift.key()];
            character.inventory = vec![items[0]];
            character.character_equipment = vec![items[1]];
            character.mount_uid = *mount.key();
            character.pets = vec![pet];
            character.eggs = vec![egg];
            character.housing = vec![housing];
            character.mailbox.inbox = vec![*mail.key()];
        })
        .unwrap();
    director
        .create_user("rider")
        .mutable(|user| user.character_uid = character_uid)
        .unwrap();

    // Only the name check of the new user reached the backing store.
    assert_eq!(source.retrieves.load(Ordering::SeqCst), 1);
    assert!(source.inner.is_empty());

    director.request_load_user_data("rider");
    director.tick();
    assert!(director.are_user_data_loaded("rider"));
    director.request_load_character_data("rider", character_uid);
    director.tick();
    assert!(director.are_character_data_loaded("rider"));
    assert_eq!(director.load_state("rider"), Some(LoadState::Complete));

    // The graph resolved from the cache alone.
    assert_eq!(source.retrieves.load(Ordering::SeqCst), 1);
    for uid in &items {
        assert!(director.get::<Item>(uid).is_available(), "item {uid} unavailable");
    }
    assert_eq!(
        director.get::<Guild>(guild.key()).immutable(|guild| guild.name.clone()).unwrap(),
        "Stable"
    );
    assert!(director.get::<Settings>(&settings).is_available());
    assert!(director.get::<Egg>(&egg).is_available());

    let profile = wire::character_profile(&director, character_uid).unwrap();
    assert_eq!(profile.character.guild.name, "Stable");
    assert_eq!(profile.mount.name, "Ace");
    assert_eq!(wire::horse_list(&director, character_uid).unwrap().horses.len(), 1);
    assert_eq!(wire::inventory(&director, character_uid).unwrap().items.len(), 1);
    assert_eq!(wire::mail_list(&director, character_uid).unwrap().mails[0].subject, "hello");
}
