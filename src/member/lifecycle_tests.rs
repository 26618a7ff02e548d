use super::*;
use crate::events::ChannelPublisher;
use crate::member::{MemberStatus, Space};
use crate::storage::JsonStore;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc::UnboundedReceiver;

fn email(raw: &str) -> Email {
    Email::parse(raw).unwrap()
}

fn emails(raw: &[&str]) -> BTreeSet<Email> {
    raw.iter().map(|e| email(e)).collect()
}

struct Fixture {
    manager: MembershipLifecycleManager,
    store: Arc<JsonStore>,
    space: Space,
    events: UnboundedReceiver<DomainEvent>,
}

async fn fixture_with(settings: InvitationConfig) -> Fixture {
    let store = Arc::new(JsonStore::in_memory());
    let space = store.create_space("Team").await.unwrap();
    let (publisher, events) = ChannelPublisher::new();
    let manager = MembershipLifecycleManager::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(publisher),
        settings,
    );
    Fixture {
        manager,
        store,
        space,
        events,
    }
}

async fn fixture() -> Fixture {
    fixture_with(InvitationConfig::default()).await
}

fn drain(rx: &mut UnboundedReceiver<DomainEvent>) -> Vec<DomainEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

/// Hides existing rows from the first `hidden` lookups, as if another writer
/// inserted them between our read and our create.
struct RacingRepository {
    inner: Arc<JsonStore>,
    hidden: AtomicUsize,
}

#[async_trait]
impl MembershipRepository for RacingRepository {
    async fn find_including_deleted(
        &self,
        space_id: &str,
        email: &Email,
    ) -> Result<Option<Membership>, StoreError> {
        let remaining = self.hidden.load(Ordering::SeqCst);
        if remaining > 0 {
            self.hidden.store(remaining - 1, Ordering::SeqCst);
            return Ok(None);
        }
        self.inner.find_including_deleted(space_id, email).await
    }

    async fn find_by_id(&self, member_id: &str) -> Result<Option<Membership>, StoreError> {
        self.inner.find_by_id(member_id).await
    }

    async fn find_by_user_and_space(
        &self,
        user_id: &str,
        space_id: &str,
    ) -> Result<Option<Membership>, StoreError> {
        self.inner.find_by_user_and_space(user_id, space_id).await
    }

    async fn list_by_space(
        &self,
        space_id: &str,
        include_deleted: bool,
    ) -> Result<Vec<Membership>, StoreError> {
        self.inner.list_by_space(space_id, include_deleted).await
    }

    async fn create(&self, member: Membership) -> Result<String, StoreError> {
        self.inner.create(member).await
    }

    async fn restore(&self, member_id: &str, fields: RestoreFields) -> Result<Membership, StoreError> {
        self.inner.restore(member_id, fields).await
    }

    async fn soft_delete(&self, member_ids: &[String]) -> Result<Vec<String>, StoreError> {
        self.inner.soft_delete(member_ids).await
    }

    async fn update(&self, member: &Membership) -> Result<(), StoreError> {
        self.inner.update(member).await
    }
}

/// Account lookup that breaks for one address.
struct FlakyDirectory {
    inner: Arc<JsonStore>,
    broken: Email,
}

#[async_trait]
impl UserDirectory for FlakyDirectory {
    async fn find_by_email(&self, email: &Email) -> Result<Option<String>, StoreError> {
        if email == &self.broken {
            return Err(StoreError::Corrupt("directory unavailable".into()));
        }
        self.inner.find_by_email(email).await
    }
}

#[tokio::test]
async fn test_invite_new_email_creates_unconfirmed_row() {
    let mut fx = fixture().await;
    let report = fx
        .manager
        .invite_by_email(&fx.space.space_id, "inviter", &emails(&["new@x.com"]))
        .await
        .unwrap();

    assert!(report.is_complete());
    let result = report.outcome_for(&email("new@x.com")).unwrap();
    assert_eq!(result.outcome, InvitationOutcome::Created);

    let member = fx.manager.get_member(&result.member_id).await.unwrap();
    assert!(!member.is_active());
    assert_eq!(member.status(), MemberStatus::Inactive);
    assert!(member.is_point);
    assert!(member.user_id.is_none());
    assert_eq!(member.invited_by.as_deref(), Some("inviter"));

    let sent = drain(&mut fx.events);
    assert_eq!(sent.len(), 1);
    assert!(matches!(&sent[0], DomainEvent::InvitationSent { email, .. } if email == "new@x.com"));
}

#[tokio::test]
async fn test_invite_links_existing_account() {
    let fx = fixture().await;
    let user = fx.store.create_user(email("known@x.com"), "Known").await.unwrap();

    let report = fx
        .manager
        .invite_by_email(&fx.space.space_id, "inviter", &emails(&["known@x.com"]))
        .await
        .unwrap();
    let id = &report.outcome_for(&email("known@x.com")).unwrap().member_id;
    let member = fx.manager.get_member(id).await.unwrap();
    assert_eq!(member.user_id, Some(user.user_id));
}

#[tokio::test]
async fn test_reinvite_after_removal_restores_same_row() {
    let mut fx = fixture().await;
    let user = fx.store.create_user(email("shawn@x.com"), "Shawn").await.unwrap();
    let original = Membership::joined(&fx.space.space_id, email("shawn@x.com"), &user.user_id);
    let member_id = fx.store.create(original).await.unwrap();

    let removed = fx
        .manager
        .remove_members(&BTreeSet::from([member_id.clone()]))
        .await
        .unwrap();
    assert_eq!(removed, vec![member_id.clone()]);

    let report = fx
        .manager
        .invite_by_email(&fx.space.space_id, "inviter", &emails(&["Shawn@X.com"]))
        .await
        .unwrap();
    let result = report.outcome_for(&email("shawn@x.com")).unwrap();
    assert_eq!(result.outcome, InvitationOutcome::Restored);
    assert_eq!(result.member_id, member_id);

    let restored = fx.manager.get_member(&member_id).await.unwrap();
    assert!(!restored.is_deleted());
    assert!(!restored.is_active());
    assert_eq!(restored.status(), MemberStatus::Inactive);
    assert!(!restored.is_point);
    assert_eq!(restored.user_id.as_deref(), Some(user.user_id.as_str()));

    let all = fx.manager.list_members(&fx.space.space_id, true).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(drain(&mut fx.events).len(), 1);
}

#[tokio::test]
async fn test_reinvite_active_member_is_untouched() {
    let mut fx = fixture().await;
    let report = fx
        .manager
        .invite_by_email(&fx.space.space_id, "inviter", &emails(&["a@x.com"]))
        .await
        .unwrap();
    let member_id = report.outcomes[0].member_id.clone();
    let activated = fx.manager.activate_member(&member_id, "user-a").await.unwrap();
    drain(&mut fx.events);

    let again = fx
        .manager
        .invite_by_email(&fx.space.space_id, "someone-else", &emails(&["a@x.com"]))
        .await
        .unwrap();
    let result = again.outcome_for(&email("a@x.com")).unwrap();
    assert_eq!(result.outcome, InvitationOutcome::AlreadyActive);
    assert_eq!(result.member_id, member_id);

    let after = fx.manager.get_member(&member_id).await.unwrap();
    assert_eq!(after, activated);
    assert!(after.is_point);
    assert!(drain(&mut fx.events).is_empty());
}

#[tokio::test]
async fn test_reinvite_pending_member_reports_already_invited() {
    let mut fx = fixture().await;
    let first = fx
        .manager
        .invite_by_email(&fx.space.space_id, "inviter", &emails(&["p@x.com"]))
        .await
        .unwrap();
    let second = fx
        .manager
        .invite_by_email(&fx.space.space_id, "inviter", &emails(&["p@x.com"]))
        .await
        .unwrap();

    assert_eq!(second.outcomes[0].outcome, InvitationOutcome::AlreadyInvited);
    assert_eq!(second.outcomes[0].member_id, first.outcomes[0].member_id);
    // a reminder notice goes out for the pending invitation
    assert_eq!(drain(&mut fx.events).len(), 2);
}

#[tokio::test]
async fn test_invite_mixed_batch() {
    let fx = fixture().await;
    let gone = fx
        .store
        .create(Membership::invited(&fx.space.space_id, email("gone@x.com"), None, None))
        .await
        .unwrap();
    fx.store.soft_delete(&[gone.clone()]).await.unwrap();
    let live = fx
        .store
        .create(Membership::joined(&fx.space.space_id, email("live@x.com"), "u-live"))
        .await
        .unwrap();

    let report = fx
        .manager
        .invite_by_email(
            &fx.space.space_id,
            "inviter",
            &emails(&["gone@x.com", "live@x.com", "fresh@x.com"]),
        )
        .await
        .unwrap();

    assert_eq!(report.outcomes.len(), 3);
    let gone_result = report.outcome_for(&email("gone@x.com")).unwrap();
    assert_eq!(gone_result.outcome, InvitationOutcome::Restored);
    assert_eq!(gone_result.member_id, gone);
    let live_result = report.outcome_for(&email("live@x.com")).unwrap();
    assert_eq!(live_result.outcome, InvitationOutcome::AlreadyActive);
    assert_eq!(live_result.member_id, live);
    assert_eq!(
        report.outcome_for(&email("fresh@x.com")).unwrap().outcome,
        InvitationOutcome::Created
    );
}

#[tokio::test]
async fn test_invite_unknown_space_fails_whole_call() {
    let fx = fixture().await;
    let err = fx
        .manager
        .invite_by_email("no-such-space", "inviter", &emails(&["a@x.com"]))
        .await
        .unwrap_err();
    assert!(matches!(err, MemberError::SpaceNotFound(id) if id == "no-such-space"));
}

#[tokio::test]
async fn test_invite_rejects_oversized_batch() {
    let settings = InvitationConfig {
        max_emails_per_request: 2,
        ..InvitationConfig::default()
    };
    let fx = fixture_with(settings).await;
    let err = fx
        .manager
        .invite_by_email(
            &fx.space.space_id,
            "inviter",
            &emails(&["a@x.com", "b@x.com", "c@x.com"]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MemberError::TooManyEmails { count: 3, max: 2 }));
    assert!(fx.store.snapshot().await.members.is_empty());
}

#[tokio::test]
async fn test_invite_empty_batch_is_empty_report() {
    let fx = fixture().await;
    let report = fx
        .manager
        .invite_by_email(&fx.space.space_id, "inviter", &BTreeSet::new())
        .await
        .unwrap();
    assert!(report.outcomes.is_empty());
    assert!(report.is_complete());
}

#[tokio::test]
async fn test_lost_create_race_resolves_to_existing_row() {
    let store = Arc::new(JsonStore::in_memory());
    let space = store.create_space("Team").await.unwrap();
    let winner = store
        .create(Membership::invited(&space.space_id, email("race@x.com"), None, None))
        .await
        .unwrap();
    let racing = Arc::new(RacingRepository {
        inner: store.clone(),
        hidden: AtomicUsize::new(1),
    });
    let (publisher, _rx) = ChannelPublisher::new();
    let manager = MembershipLifecycleManager::new(
        racing,
        store.clone(),
        store.clone(),
        Arc::new(publisher),
        InvitationConfig::default(),
    );

    let report = manager
        .invite_by_email(&space.space_id, "inviter", &emails(&["race@x.com"]))
        .await
        .unwrap();
    let result = report.outcome_for(&email("race@x.com")).unwrap();
    assert_eq!(result.outcome, InvitationOutcome::AlreadyInvited);
    assert_eq!(result.member_id, winner);
    assert_eq!(store.snapshot().await.members.len(), 1);
}

#[tokio::test]
async fn test_conflict_retries_exhausted_is_reported_per_email() {
    let store = Arc::new(JsonStore::in_memory());
    let space = store.create_space("Team").await.unwrap();
    store
        .create(Membership::invited(&space.space_id, email("race@x.com"), None, None))
        .await
        .unwrap();
    let racing = Arc::new(RacingRepository {
        inner: store.clone(),
        hidden: AtomicUsize::new(usize::MAX),
    });
    let (publisher, _rx) = ChannelPublisher::new();
    let settings = InvitationConfig {
        conflict_retries: 0,
        ..InvitationConfig::default()
    };
    let manager = MembershipLifecycleManager::new(
        racing,
        store.clone(),
        store.clone(),
        Arc::new(publisher),
        settings,
    );

    let report = manager
        .invite_by_email(&space.space_id, "inviter", &emails(&["race@x.com", "ok@x.com"]))
        .await
        .unwrap();
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        MemberError::ConflictRetriesExhausted { attempts: 1, .. }
    ));
    assert_eq!(
        report.outcome_for(&email("ok@x.com")).unwrap().outcome,
        InvitationOutcome::Created
    );
}

#[tokio::test]
async fn test_one_failing_address_does_not_affect_others() {
    let store = Arc::new(JsonStore::in_memory());
    let space = store.create_space("Team").await.unwrap();
    let users = Arc::new(FlakyDirectory {
        inner: store.clone(),
        broken: email("bad@x.com"),
    });
    let (publisher, mut rx) = ChannelPublisher::new();
    let manager = MembershipLifecycleManager::new(
        store.clone(),
        users,
        store.clone(),
        Arc::new(publisher),
        InvitationConfig::default(),
    );

    let report = manager
        .invite_by_email(&space.space_id, "inviter", &emails(&["bad@x.com", "good@x.com"]))
        .await
        .unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.failures[0].email, email("bad@x.com"));
    assert!(matches!(report.failures[0].error, MemberError::Store(_)));
    assert!(report.outcome_for(&email("good@x.com")).is_some());
    assert_eq!(store.snapshot().await.members.len(), 1);
    assert_eq!(drain(&mut rx).len(), 1);
}

#[tokio::test]
async fn test_invite_survives_closed_event_channel() {
    let store = Arc::new(JsonStore::in_memory());
    let space = store.create_space("Team").await.unwrap();
    let (publisher, rx) = ChannelPublisher::new();
    drop(rx);
    let manager = MembershipLifecycleManager::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(publisher),
        InvitationConfig::default(),
    );

    let report = manager
        .invite_by_email(&space.space_id, "inviter", &emails(&["a@x.com"]))
        .await
        .unwrap();
    assert!(report.is_complete());
}

#[tokio::test]
async fn test_remove_is_noop_for_unknown_and_removed_ids() {
    let fx = fixture().await;
    let id = fx
        .store
        .create(Membership::invited(&fx.space.space_id, email("a@x.com"), None, None))
        .await
        .unwrap();

    let ids = BTreeSet::from([id.clone(), "unknown".to_string()]);
    assert_eq!(fx.manager.remove_members(&ids).await.unwrap(), vec![id.clone()]);
    assert!(fx.manager.remove_members(&ids).await.unwrap().is_empty());

    let member = fx.manager.get_member(&id).await.unwrap();
    assert!(member.is_deleted());
    assert!(fx
        .manager
        .get_by_space_and_email(&fx.space.space_id, &email("a@x.com"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_activate_sets_account_and_status() {
    let fx = fixture().await;
    let id = fx
        .store
        .create(Membership::invited(&fx.space.space_id, email("a@x.com"), None, None))
        .await
        .unwrap();

    let member = fx.manager.activate_member(&id, "user-a").await.unwrap();
    assert!(member.is_active());
    assert_eq!(member.status(), MemberStatus::Active);
    assert_eq!(member.user_id.as_deref(), Some("user-a"));

    let by_user = fx
        .manager
        .get_by_user_and_space("user-a", &fx.space.space_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_user.member_id, id);

    // second activation is a no-op
    let again = fx.manager.activate_member(&id, "user-a").await.unwrap();
    assert_eq!(again, member);
}

#[tokio::test]
async fn test_activate_removed_member_fails() {
    let fx = fixture().await;
    let id = fx
        .store
        .create(Membership::invited(&fx.space.space_id, email("a@x.com"), None, None))
        .await
        .unwrap();
    fx.store.soft_delete(&[id.clone()]).await.unwrap();

    let err = fx.manager.activate_member(&id, "user-a").await.unwrap_err();
    assert!(matches!(err, MemberError::MemberNotFound(_)));
    let err = fx.manager.activate_member("missing", "user-a").await.unwrap_err();
    assert!(matches!(err, MemberError::MemberNotFound(_)));
}

#[tokio::test]
async fn test_list_members_unknown_space() {
    let fx = fixture().await;
    assert!(matches!(
        fx.manager.list_members("nope", false).await,
        Err(MemberError::SpaceNotFound(_))
    ));
}

#[tokio::test]
async fn test_concurrent_invites_for_same_address_create_one_row() {
    let fx = fixture().await;
    let manager = Arc::new(fx.manager);
    let batch = emails(&["same@x.com"]);

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let manager = manager.clone();
            let space_id = fx.space.space_id.clone();
            let batch = batch.clone();
            tokio::spawn(async move { manager.invite_by_email(&space_id, "inviter", &batch).await })
        })
        .collect();

    let mut created = 0;
    for task in tasks {
        let report = task.await.unwrap().unwrap();
        assert!(report.is_complete());
        if report.outcomes[0].outcome == InvitationOutcome::Created {
            created += 1;
        }
    }
    assert_eq!(created, 1);
    assert_eq!(fx.store.snapshot().await.members.len(), 1);
}
