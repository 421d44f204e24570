//! In-memory collaborator tests

use lyra_core::{
    FavoritesService, Identity, InMemoryFavorites, InMemoryPlayHistory, PlayHistoryService,
    ServiceError, TrackId,
};

fn alice() -> Identity {
    Identity::new("alice", "Alice")
}

#[tokio::test]
async fn favorites_add_list_remove() {
    let store = InMemoryFavorites::new();
    let user = alice();

    store.add(&user, &TrackId::new("a")).await.unwrap();
    store.add(&user, &TrackId::new("b")).await.unwrap();
    store.remove(&user, &TrackId::new("a")).await.unwrap();

    let liked = store.list(&user).await.unwrap();
    assert_eq!(liked.len(), 1);
    assert!(liked.contains(&TrackId::new("b")));
}

#[tokio::test]
async fn favorites_are_scoped_per_identity() {
    let store = InMemoryFavorites::new();
    store.seed(&alice().id, [TrackId::new("a")]);

    let bob = Identity::new("bob", "Bob");
    assert!(store.list(&bob).await.unwrap().is_empty());
    assert_eq!(store.list(&alice()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn offline_favorites_fail_without_side_effects() {
    let store = InMemoryFavorites::new();
    store.set_offline(true);

    let err = store.add(&alice(), &TrackId::new("a")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Network(_)));

    store.set_offline(false);
    assert!(store.list(&alice()).await.unwrap().is_empty());
}

#[tokio::test]
async fn recently_played_is_distinct_and_newest_first() {
    let history = InMemoryPlayHistory::new();
    let user = alice();
    for id in ["a", "b", "a", "c"] {
        history.record(&user, &TrackId::new(id)).await.unwrap();
    }

    let recent = history.recently_played(&user.id, 10);
    assert_eq!(
        recent,
        vec![TrackId::new("c"), TrackId::new("a"), TrackId::new("b")]
    );
    assert_eq!(history.entries().len(), 4);
}

#[tokio::test]
async fn offline_history_reports_network_error() {
    let history = InMemoryPlayHistory::new();
    history.set_offline(true);
    assert!(history.record(&alice(), &TrackId::new("a")).await.is_err());
    assert!(history.entries().is_empty());
}
