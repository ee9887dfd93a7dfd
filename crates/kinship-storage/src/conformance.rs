//! Behavior every storage backend must share, exercised from each backend's
//! test module.

use crate::batch::WriteBatch;
use crate::error::StorageError;
use crate::traits::StorageBackend;
use chrono::Utc;
use kinship_core::{
    Comment, Direction, Label, Node, NodeId, NodePatch, Post, PostPatch, RelationType,
    Relationship, RelationshipKey, User, UserPatch,
};

fn user(name: &str) -> Node {
    Node::User(User::new(
        NodeId::new(),
        name,
        format!("{}@example.com", name.to_lowercase()),
        Utc::now(),
    ))
}

fn post(title: &str) -> Node {
    Node::Post(Post::new(NodeId::new(), title, "body", Utc::now()))
}

fn edge(rel_type: RelationType, source: NodeId, target: NodeId) -> Relationship {
    Relationship::new(RelationshipKey::new(rel_type, source, target), Utc::now())
}

pub(crate) async fn node_store<S: StorageBackend>(storage: &S) {
    let alice = user("Alice");
    let id = alice.id();
    storage.create_node(&alice).await.unwrap();

    // Lookups are label scoped
    assert_eq!(storage.get_node(Label::User, &id).await.unwrap(), Some(alice.clone()));
    assert!(storage.get_node(Label::Post, &id).await.unwrap().is_none());
    assert!(storage.get_node(Label::User, &NodeId::new()).await.unwrap().is_none());

    // Duplicate ids are rejected
    let err = storage.create_node(&alice).await.unwrap_err();
    assert!(matches!(err, StorageError::DuplicateNode(dup) if dup == id));

    // Scans only return the requested label
    let p = post("Hello");
    storage.create_node(&p).await.unwrap();
    let users = storage.scan_nodes(Label::User).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id(), id);
    assert_eq!(storage.scan_nodes(Label::Post).await.unwrap().len(), 1);
    assert!(storage.scan_nodes(Label::Comment).await.unwrap().is_empty());

    // Partial update leaves omitted fields untouched
    let patch = NodePatch::from(UserPatch::new().with_name("Alicia"));
    let updated = storage.update_node(&id, &patch).await.unwrap().unwrap();
    let updated = updated.into_user().unwrap();
    assert_eq!(updated.name, "Alicia");
    assert_eq!(updated.email, "alice@example.com");
    let stored = storage.get_node(Label::User, &id).await.unwrap().unwrap();
    assert_eq!(stored.into_user().unwrap().name, "Alicia");

    // Updates on a missing id or another label report absence
    assert!(storage.update_node(&NodeId::new(), &patch).await.unwrap().is_none());
    let wrong_label = NodePatch::from(PostPatch::new().with_title("x"));
    assert!(storage.update_node(&id, &wrong_label).await.unwrap().is_none());

    // Deleting with the wrong label leaves the node, deleting twice is fine
    storage.delete_node(Label::Post, &id).await.unwrap();
    assert!(storage.get_node(Label::User, &id).await.unwrap().is_some());
    storage.delete_node(Label::User, &id).await.unwrap();
    storage.delete_node(Label::User, &id).await.unwrap();
    assert!(storage.get_node(Label::User, &id).await.unwrap().is_none());
}

pub(crate) async fn relationship_store<S: StorageBackend>(storage: &S) {
    let a = user("A");
    let b = user("B");
    let p = post("P");
    for node in [&a, &b, &p] {
        storage.create_node(node).await.unwrap();
    }
    let (a, b, p) = (a.id(), b.id(), p.id());

    // Merge is idempotent and keeps the first record
    let first = edge(RelationType::Likes, a, p);
    storage.merge_relationship(first.clone()).await.unwrap();
    storage
        .merge_relationship(edge(RelationType::Likes, a, p))
        .await
        .unwrap();
    let key = RelationshipKey::new(RelationType::Likes, a, p);
    assert_eq!(storage.get_relationship(&key).await.unwrap(), Some(first));
    assert_eq!(
        storage.neighbors(RelationType::Likes, &a, Direction::Outgoing).await.unwrap(),
        vec![p]
    );
    assert_eq!(
        storage.neighbors(RelationType::Likes, &p, Direction::Incoming).await.unwrap(),
        vec![a]
    );
    assert!(storage
        .neighbors(RelationType::Likes, &p, Direction::Outgoing)
        .await
        .unwrap()
        .is_empty());

    // Directed edges are not found in reverse
    let reverse = RelationshipKey::new(RelationType::Likes, p, a);
    assert!(!storage.relationship_exists(&reverse).await.unwrap());

    // Symmetric edges are stored once and read from both ends
    storage
        .merge_relationship(edge(RelationType::FriendsWith, a, b))
        .await
        .unwrap();
    storage
        .merge_relationship(edge(RelationType::FriendsWith, b, a))
        .await
        .unwrap();
    let ab = RelationshipKey::new(RelationType::FriendsWith, b, a);
    assert!(storage.relationship_exists(&ab).await.unwrap());
    assert_eq!(
        storage.neighbors(RelationType::FriendsWith, &a, Direction::Outgoing).await.unwrap(),
        vec![b]
    );
    assert_eq!(
        storage.neighbors(RelationType::FriendsWith, &b, Direction::Outgoing).await.unwrap(),
        vec![a]
    );

    // Types do not leak into each other
    assert!(storage
        .neighbors(RelationType::Created, &a, Direction::Both)
        .await
        .unwrap()
        .is_empty());

    // Delete is idempotent
    storage.delete_relationship(&key).await.unwrap();
    storage.delete_relationship(&key).await.unwrap();
    assert!(!storage.relationship_exists(&key).await.unwrap());
    storage
        .delete_relationship(&RelationshipKey::new(RelationType::FriendsWith, a, b))
        .await
        .unwrap();
    assert!(storage
        .neighbors(RelationType::FriendsWith, &b, Direction::Both)
        .await
        .unwrap()
        .is_empty());

    // Edges need both endpoints
    let ghost = NodeId::new();
    let err = storage
        .merge_relationship(edge(RelationType::Likes, a, ghost))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::DanglingRelationship(_)));
    assert!(storage
        .neighbors(RelationType::Likes, &a, Direction::Outgoing)
        .await
        .unwrap()
        .is_empty());
}

pub(crate) async fn delete_incident<S: StorageBackend>(storage: &S) {
    let a = user("A");
    let b = user("B");
    let p = post("P");
    for node in [&a, &b, &p] {
        storage.create_node(node).await.unwrap();
    }
    let (a, b, p) = (a.id(), b.id(), p.id());

    let batch = WriteBatch::new()
        .merge_relationship(edge(RelationType::Created, a, p))
        .merge_relationship(edge(RelationType::Likes, b, p))
        .merge_relationship(edge(RelationType::FriendsWith, a, b));
    storage.commit(batch).await.unwrap();

    storage.delete_incident(&p).await.unwrap();
    assert!(storage
        .neighbors(RelationType::Created, &a, Direction::Outgoing)
        .await
        .unwrap()
        .is_empty());
    assert!(storage
        .neighbors(RelationType::Likes, &b, Direction::Outgoing)
        .await
        .unwrap()
        .is_empty());
    assert!(storage
        .relationship_exists(&RelationshipKey::new(RelationType::FriendsWith, a, b))
        .await
        .unwrap());

    storage.delete_incident(&b).await.unwrap();
    assert!(storage
        .neighbors(RelationType::FriendsWith, &a, Direction::Both)
        .await
        .unwrap()
        .is_empty());

    // Nodes themselves survive
    assert!(storage.get_node(Label::Post, &p).await.unwrap().is_some());
}

pub(crate) async fn batch_atomicity<S: StorageBackend>(storage: &S) {
    let author = user("Author");
    storage.create_node(&author).await.unwrap();
    let author = author.id();

    // A satisfied batch commits every write
    let comment = Node::Comment(Comment::new(NodeId::new(), "first", Utc::now()));
    let p = post("P");
    let batch = WriteBatch::new()
        .require_node(Label::User, author)
        .create_node(p.clone())
        .create_node(comment.clone())
        .merge_relationship(edge(RelationType::Created, author, p.id()))
        .merge_relationship(edge(RelationType::HasComment, p.id(), comment.id()));
    storage.commit(batch).await.unwrap();
    assert_eq!(
        storage
            .neighbors(RelationType::HasComment, &p.id(), Direction::Outgoing)
            .await
            .unwrap(),
        vec![comment.id()]
    );

    // A failed precondition rolls back earlier writes in the batch
    let missing = NodeId::new();
    let orphan = post("Orphan");
    let batch = WriteBatch::new()
        .create_node(orphan.clone())
        .merge_relationship(edge(RelationType::Likes, author, orphan.id()))
        .require_node(Label::User, missing);
    let err = storage.commit(batch).await.unwrap_err();
    assert!(matches!(
        err,
        StorageError::MissingNode { label: Label::User, id } if id == missing
    ));
    assert!(storage.get_node(Label::Post, &orphan.id()).await.unwrap().is_none());
    assert!(storage
        .neighbors(RelationType::Likes, &author, Direction::Outgoing)
        .await
        .unwrap()
        .is_empty());

    // Preconditions check the label, not just the id
    let batch = WriteBatch::new().require_node(Label::Post, author);
    assert!(storage.commit(batch).await.is_err());

    // Nodes deleted earlier in a batch no longer satisfy later operations
    let batch = WriteBatch::new()
        .delete_incident(p.id())
        .delete_node(Label::Post, p.id())
        .require_node(Label::Post, p.id());
    assert!(storage.commit(batch).await.is_err());
    assert!(storage.get_node(Label::Post, &p.id()).await.unwrap().is_some());
    assert!(storage
        .relationship_exists(&RelationshipKey::new(
            RelationType::Created,
            author,
            p.id()
        ))
        .await
        .unwrap());

    // Cascading delete within one batch
    let batch = WriteBatch::new()
        .delete_incident(p.id())
        .delete_node(Label::Post, p.id());
    storage.commit(batch).await.unwrap();
    assert!(storage.get_node(Label::Post, &p.id()).await.unwrap().is_none());
    assert!(storage
        .neighbors(RelationType::HasComment, &p.id(), Direction::Outgoing)
        .await
        .unwrap()
        .is_empty());
    assert!(storage.get_node(Label::Comment, &comment.id()).await.unwrap().is_some());
}
