#![allow(clippy::indexing_slicing)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use chrono::{Duration, Utc};
use common::{create_test_dir, harness, state_file, wire};
use membership_daemon::events::{AuditAction, AuditEvent, DomainEvent};
use membership_daemon::member::{Email, Membership, MembershipRepository};
use membership_daemon::rubbish::{
    NodeRepository, NodeType, RecoverTarget, RubbishError, RubbishListQuery,
};
use membership_daemon::storage::JsonStore;
use std::collections::BTreeSet;
use std::sync::Arc;

fn first_page(size: usize) -> RubbishListQuery {
    RubbishListQuery {
        size,
        is_over_limit: false,
        last_node_id: None,
    }
}

#[tokio::test]
async fn test_paging_through_the_bin() {
    let dir = create_test_dir();
    let h = harness(&state_file(dir.path())).await;
    let owner = Membership::joined(&h.space.space_id, Email::parse("o@x.com").unwrap(), "u-o");
    let member_id = h.store.create(owner).await.unwrap();

    for i in 0..7 {
        let node = h
            .store
            .add_node(&h.space.space_id, &h.space.root_node_id, &format!("n{i}"), NodeType::Datasheet)
            .await
            .unwrap();
        h.store
            .move_to_rubbish_at(&node.node_id, &member_id, Utc::now() - Duration::hours(i))
            .await
            .unwrap();
    }

    let mut seen = Vec::new();
    let mut query = first_page(5);
    loop {
        let page = h
            .rubbish
            .list(&h.space.space_id, &member_id, &query)
            .await
            .unwrap();
        if page.is_empty() {
            break;
        }
        query.last_node_id = page.last().map(|n| n.node_id.clone());
        seen.extend(page.into_iter().map(|n| n.name));
    }
    assert_eq!(seen, vec!["n0", "n1", "n2", "n3", "n4", "n5", "n6"]);
}

#[tokio::test]
async fn test_recover_and_delete_persist_across_restart() {
    let dir = create_test_dir();
    let path = state_file(dir.path());
    let mut h = harness(&path).await;
    let owner = Membership::joined(&h.space.space_id, Email::parse("o@x.com").unwrap(), "u-o");
    let member_id = h.store.create(owner).await.unwrap();

    let keep = h
        .store
        .add_node(&h.space.space_id, &h.space.root_node_id, "keep", NodeType::Folder)
        .await
        .unwrap();
    let drop_me = h
        .store
        .add_node(&h.space.space_id, &h.space.root_node_id, "drop", NodeType::Form)
        .await
        .unwrap();
    h.store.move_to_rubbish(&keep.node_id, &member_id).await.unwrap();
    h.store.move_to_rubbish(&drop_me.node_id, &member_id).await.unwrap();

    let target = RecoverTarget {
        node_id: keep.node_id.clone(),
        parent_id: None,
    };
    h.rubbish
        .recover(&h.space.space_id, &member_id, "u-o", &target)
        .await
        .unwrap();
    h.rubbish
        .delete(&h.space.space_id, &member_id, "u-o", &drop_me.node_id)
        .await
        .unwrap();

    let audits: Vec<_> = h
        .take_events()
        .into_iter()
        .filter_map(|e| match e {
            DomainEvent::Audit(AuditEvent { action, node_id, .. }) => Some((action, node_id)),
            _ => None,
        })
        .collect();
    assert_eq!(
        audits,
        vec![
            (AuditAction::RecoverRubbishNode, keep.node_id.clone()),
            (AuditAction::DeleteRubbishNode, drop_me.node_id.clone()),
        ]
    );

    let space = h.space.clone();
    drop(h);
    let store = Arc::new(JsonStore::open(&path).await.unwrap());
    let reopened = wire(store, space);

    let restored = reopened.store.find_node(&keep.node_id).await.unwrap().unwrap();
    assert!(!restored.is_in_rubbish());
    assert_eq!(restored.parent_id.as_deref(), Some(reopened.space.root_node_id.as_str()));
    assert!(reopened.store.find_node(&drop_me.node_id).await.unwrap().is_none());
    assert!(reopened
        .rubbish
        .list(&reopened.space.space_id, &member_id, &first_page(20))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_removed_member_loses_rubbish_access() {
    let dir = create_test_dir();
    let h = harness(&state_file(dir.path())).await;
    let owner = Membership::joined(&h.space.space_id, Email::parse("o@x.com").unwrap(), "u-o");
    let member_id = h.store.create(owner).await.unwrap();
    let node = h
        .store
        .add_node(&h.space.space_id, &h.space.root_node_id, "doc", NodeType::Datasheet)
        .await
        .unwrap();
    h.store.move_to_rubbish(&node.node_id, &member_id).await.unwrap();

    h.members
        .remove_members(&BTreeSet::from([member_id.clone()]))
        .await
        .unwrap();

    assert!(h
        .rubbish
        .list(&h.space.space_id, &member_id, &first_page(20))
        .await
        .unwrap()
        .is_empty());
    assert!(matches!(
        h.rubbish
            .delete(&h.space.space_id, &member_id, "u-o", &node.node_id)
            .await,
        Err(RubbishError::PermissionDenied { .. })
    ));
}

#[tokio::test]
async fn test_binned_subtree_is_not_a_recovery_target() {
    let dir = create_test_dir();
    let path = state_file(dir.path());
    let h = harness(&path).await;
    let owner = Membership::joined(&h.space.space_id, Email::parse("o@x.com").unwrap(), "u-o");
    let member_id = h.store.create(owner).await.unwrap();

    let folder = h
        .store
        .add_node(&h.space.space_id, &h.space.root_node_id, "Folder", NodeType::Folder)
        .await
        .unwrap();
    let child = h
        .store
        .add_node(&h.space.space_id, &folder.node_id, "Child", NodeType::Folder)
        .await
        .unwrap();
    h.store.move_to_rubbish(&folder.node_id, &member_id).await.unwrap();

    let under_child = RecoverTarget {
        node_id: folder.node_id.clone(),
        parent_id: Some(child.node_id.clone()),
    };
    assert!(matches!(
        h.rubbish
            .recover(&h.space.space_id, &member_id, "u-o", &under_child)
            .await,
        Err(RubbishError::ParentNotFound(_))
    ));

    // nothing was written: after a restart the folder is still binned and listed
    let space = h.space.clone();
    drop(h);
    let reopened = wire(Arc::new(JsonStore::open(&path).await.unwrap()), space);
    let listed = reopened
        .rubbish
        .list(&reopened.space.space_id, &member_id, &first_page(20))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].node_id, folder.node_id);
    let stored_child = reopened.store.find_node(&child.node_id).await.unwrap().unwrap();
    assert_eq!(stored_child.parent_id, Some(folder.node_id));
}
