//! End-to-end tests for the graph engine

use chrono::{TimeZone, Utc};
use futures::future::join_all;
use kinship_core::{
    Direction, Error, FixedClock, Label, NodeId, RelationType, RelationshipKey, SystemClock,
};
use kinship_engine::GraphEngine;
use kinship_storage::{MemoryStorage, StorageBackend};
use std::sync::Arc;

fn engine() -> (Arc<MemoryStorage>, GraphEngine) {
    let storage = Arc::new(MemoryStorage::new());
    let engine = GraphEngine::new(storage.clone());
    (storage, engine)
}

async fn user(engine: &GraphEngine, name: &str) -> NodeId {
    engine
        .create_user(name, &format!("{}@example.com", name.to_lowercase()))
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_created_user_round_trips() {
    let (_, engine) = engine();
    let created = engine.create_user("Grace", "grace@example.com").await.unwrap();

    let fetched = engine.get_user(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Grace");
    assert_eq!(fetched.email, "grace@example.com");
    assert!(fetched.created_at <= Utc::now());
}

#[tokio::test]
async fn test_injected_clock_stamps_nodes() {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let engine = GraphEngine::with_clock(Arc::new(MemoryStorage::new()), Arc::new(FixedClock(at)));

    let u = engine.create_user("Ada", "ada@example.com").await.unwrap();
    let p = engine.create_post("T", "C", &u.id).await.unwrap();
    let c = engine.create_comment("nice", &u.id, &p.id).await.unwrap();
    assert_eq!(u.created_at, at);
    assert_eq!(p.created_at, at);
    assert_eq!(c.created_at, at);

    let edge = engine
        .storage()
        .get_relationship(&RelationshipKey::new(RelationType::Created, u.id, p.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(edge.created_at, at);
}

#[tokio::test]
async fn test_friendship_added_from_both_sides_is_one_edge() {
    let (storage, engine) = engine();
    let a = user(&engine, "A").await;
    let b = user(&engine, "B").await;

    engine.add_friend(&a, &b).await.unwrap();
    engine.add_friend(&b, &a).await.unwrap();

    assert_eq!(storage.relationship_count().unwrap(), 1);
    assert!(engine.are_friends(&a, &b).await.unwrap());
    assert!(engine.are_friends(&b, &a).await.unwrap());
}

#[tokio::test]
async fn test_self_friendship_fails() {
    let (_, engine) = engine();
    let a = user(&engine, "A").await;

    assert!(matches!(
        engine.add_friend(&a, &a).await,
        Err(Error::SelfRelation(id)) if id == a
    ));
    assert!(engine.friends(&a).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_friend_without_friendship_is_noop() {
    let (_, engine) = engine();
    let a = user(&engine, "A").await;
    let b = user(&engine, "B").await;

    engine.remove_friend(&a, &b).await.unwrap();
    assert!(!engine.are_friends(&a, &b).await.unwrap());
}

#[tokio::test]
async fn test_mutual_friends_is_intersection() {
    let (_, engine) = engine();
    let a = user(&engine, "A").await;
    let b = user(&engine, "B").await;
    let x = user(&engine, "X").await;
    let y = user(&engine, "Y").await;
    let z = user(&engine, "Z").await;
    let w = user(&engine, "W").await;

    // Insertion order and orientation vary on purpose
    engine.add_friend(&z, &b).await.unwrap();
    engine.add_friend(&a, &x).await.unwrap();
    engine.add_friend(&b, &w).await.unwrap();
    engine.add_friend(&y, &a).await.unwrap();
    engine.add_friend(&b, &y).await.unwrap();
    engine.add_friend(&a, &z).await.unwrap();

    let mut mutual: Vec<NodeId> = engine
        .mutual_friends(&a, &b)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();
    mutual.sort();
    let mut expected = vec![y, z];
    expected.sort();
    assert_eq!(mutual, expected);

    // Becoming friends does not put a or b in their own result
    engine.add_friend(&a, &b).await.unwrap();
    let mutual = engine.mutual_friends(&b, &a).await.unwrap();
    assert_eq!(mutual.len(), 2);
    assert!(mutual.iter().all(|u| u.id != a && u.id != b));
}

#[tokio::test]
async fn test_double_like_is_single_edge() {
    let (_, engine) = engine();
    let u = user(&engine, "U").await;
    let p = engine.create_post("T", "C", &u).await.unwrap();

    engine.like_post(&u, &p.id).await.unwrap();
    engine.like_post(&u, &p.id).await.unwrap();

    let likers = engine.post_likers(&p.id).await.unwrap();
    assert_eq!(likers.len(), 1);
    assert_eq!(likers[0].id, u);
}

#[tokio::test]
async fn test_deleting_author_keeps_content() {
    let (_, engine) = engine();
    let u = user(&engine, "U").await;
    let fan = user(&engine, "Fan").await;
    let p = engine.create_post("T", "C", &u).await.unwrap();
    let c = engine.create_comment("mine", &u, &p.id).await.unwrap();
    engine.add_friend(&u, &fan).await.unwrap();
    engine.like_post(&fan, &p.id).await.unwrap();

    assert!(engine.delete_user(&u).await.unwrap());

    assert!(engine.posts_by_user(&u).await.unwrap().is_empty());
    assert_eq!(engine.get_post(&p.id).await.unwrap(), Some(p.clone()));
    assert_eq!(engine.get_comment(&c.id).await.unwrap(), Some(c.clone()));
    assert!(engine
        .storage()
        .neighbors(RelationType::Created, &p.id, Direction::Incoming)
        .await
        .unwrap()
        .is_empty());

    // Unrelated edges on the content survive
    assert_eq!(engine.comments_by_post(&p.id).await.unwrap(), vec![c]);
    assert_eq!(engine.post_likers(&p.id).await.unwrap().len(), 1);
    assert!(engine.friends(&fan).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_post_detaches_comments() {
    let (_, engine) = engine();
    let u = user(&engine, "U").await;
    let p = engine.create_post("T", "C", &u).await.unwrap();
    let c1 = engine.create_comment("one", &u, &p.id).await.unwrap();
    let c2 = engine.create_comment("two", &u, &p.id).await.unwrap();
    engine.like_post(&u, &p.id).await.unwrap();

    assert!(engine.delete_post(&p.id).await.unwrap());

    assert!(engine.get_post(&p.id).await.unwrap().is_none());
    assert!(engine.comments_by_post(&p.id).await.unwrap().is_empty());
    assert!(engine
        .storage()
        .neighbors(RelationType::HasComment, &p.id, Direction::Outgoing)
        .await
        .unwrap()
        .is_empty());
    assert!(engine.get_comment(&c1.id).await.unwrap().is_some());
    assert!(engine.get_comment(&c2.id).await.unwrap().is_some());
    assert!(engine.posts_by_user(&u).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let (storage, engine) = engine();
    let u1 = user(&engine, "U1").await;
    let u2 = user(&engine, "U2").await;

    let p1 = engine.create_post("T", "C", &u1).await.unwrap();
    let c1 = engine.create_comment("nice", &u2, &p1.id).await.unwrap();
    let comments: Vec<NodeId> = engine
        .comments_by_post(&p1.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(comments, vec![c1.id]);

    engine.add_friend(&u1, &u2).await.unwrap();
    assert!(engine.mutual_friends(&u1, &u2).await.unwrap().is_empty());

    engine.like_post(&u2, &p1.id).await.unwrap();
    let before = storage.relationship_count().unwrap();
    engine.like_post(&u2, &p1.id).await.unwrap();
    assert_eq!(storage.relationship_count().unwrap(), before);
    assert!(engine
        .storage()
        .relationship_exists(&RelationshipKey::new(RelationType::Likes, u2, p1.id))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_missing_nodes_are_not_found() {
    let (_, engine) = engine();
    let u = user(&engine, "U").await;
    let ghost = NodeId::new();

    let err = engine.add_friend(&u, &ghost).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { label: Label::User, id } if id == ghost));
    assert!(engine.mutual_friends(&ghost, &u).await.unwrap_err().is_not_found());
    assert!(engine.like_post(&u, &ghost).await.unwrap_err().is_not_found());
    assert!(engine.like_comment(&u, &ghost).await.unwrap_err().is_not_found());
    assert!(engine.unlike_comment(&u, &ghost).await.unwrap_err().is_not_found());
    assert!(engine.comment_likers(&ghost).await.unwrap_err().is_not_found());
    assert!(engine.get_post(&ghost).await.unwrap().is_none());
    assert!(!engine.delete_comment(&ghost).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_add_friend_leaves_one_edge() {
    let storage = Arc::new(MemoryStorage::new());
    let engine = Arc::new(GraphEngine::with_clock(storage.clone(), Arc::new(SystemClock)));
    let a = user(&engine, "A").await;
    let b = user(&engine, "B").await;

    let tasks = (0..32).map(|i| {
        let engine = engine.clone();
        tokio::spawn(async move {
            if i % 2 == 0 {
                engine.add_friend(&a, &b).await
            } else {
                engine.add_friend(&b, &a).await
            }
        })
    });

    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }
    assert_eq!(storage.relationship_count().unwrap(), 1);
    assert_eq!(engine.friends(&a).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_and_deletes_never_dangle() {
    let storage = Arc::new(MemoryStorage::new());
    let engine = Arc::new(GraphEngine::new(storage.clone()));
    let author = user(&engine, "Author").await;

    let creates = (0..16).map(|i| {
        let engine = engine.clone();
        tokio::spawn(async move { engine.create_post(&format!("post {}", i), "body", &author).await })
    });
    let delete = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.delete_user(&author).await })
    };

    let mut created = Vec::new();
    for result in join_all(creates).await {
        match result.unwrap() {
            Ok(post) => created.push(post.id),
            Err(err) => assert!(err.is_not_found()),
        }
    }
    delete.await.unwrap().unwrap();

    // Every post that made it in was created before the author vanished,
    // and its CREATED edge went with the author.
    assert_eq!(engine.list_posts().await.unwrap().len(), created.len());
    for post in created {
        assert!(engine
            .storage()
            .neighbors(RelationType::Created, &post, Direction::Incoming)
            .await
            .unwrap()
            .is_empty());
    }
    assert_eq!(storage.relationship_count().unwrap(), 0);
}
