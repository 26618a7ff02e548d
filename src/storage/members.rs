use super::{JsonStore, StoreError};
use crate::member::{
    Email, MembershipRepository, Membership, RestoreFields, Space, SpaceDirectory, UserDirectory,
};
use async_trait::async_trait;
use std::cmp::Reverse;

#[async_trait]
impl MembershipRepository for JsonStore {
    async fn find_including_deleted(
        &self,
        space_id: &str,
        email: &Email,
    ) -> Result<Option<Membership>, StoreError> {
        Ok(self
            .read(|state| {
                state
                    .members
                    .iter()
                    .filter(|m| m.space_id == space_id && &m.email == email)
                    .max_by_key(|m| (!m.is_deleted(), m.updated_at))
                    .cloned()
            })
            .await)
    }

    async fn find_by_id(&self, member_id: &str) -> Result<Option<Membership>, StoreError> {
        Ok(self
            .read(|state| state.members.iter().find(|m| m.member_id == member_id).cloned())
            .await)
    }

    async fn find_by_user_and_space(
        &self,
        user_id: &str,
        space_id: &str,
    ) -> Result<Option<Membership>, StoreError> {
        Ok(self
            .read(|state| {
                state
                    .members
                    .iter()
                    .find(|m| {
                        m.space_id == space_id
                            && m.user_id.as_deref() == Some(user_id)
                            && !m.is_deleted()
                    })
                    .cloned()
            })
            .await)
    }

    async fn list_by_space(
        &self,
        space_id: &str,
        include_deleted: bool,
    ) -> Result<Vec<Membership>, StoreError> {
        let mut members: Vec<Membership> = self
            .read(|state| {
                state
                    .members
                    .iter()
                    .filter(|m| m.space_id == space_id && (include_deleted || !m.is_deleted()))
                    .cloned()
                    .collect()
            })
            .await;
        members.sort_by_key(|m| (Reverse(m.created_at), m.member_id.clone()));
        Ok(members)
    }

    async fn create(&self, membership: Membership) -> Result<String, StoreError> {
        self.mutate(move |state| {
            if state.members.iter().any(|m| m.member_id == membership.member_id) {
                return Err(StoreError::DuplicateId(membership.member_id));
            }
            // unique (space_id, email): a soft-deleted row also counts, since
            // it is restored rather than shadowed
            if state
                .members
                .iter()
                .any(|m| m.space_id == membership.space_id && m.email == membership.email)
            {
                return Err(StoreError::Conflict {
                    space_id: membership.space_id,
                    email: membership.email.to_string(),
                });
            }
            let member_id = membership.member_id.clone();
            state.members.push(membership);
            Ok(member_id)
        })
        .await
    }

    async fn restore(
        &self,
        member_id: &str,
        fields: RestoreFields,
    ) -> Result<Membership, StoreError> {
        self.mutate(|state| {
            let member = state
                .members
                .iter_mut()
                .find(|m| m.member_id == member_id)
                .ok_or_else(|| StoreError::NotFound(member_id.to_string()))?;
            member.restore(fields);
            Ok(member.clone())
        })
        .await
    }

    async fn soft_delete(&self, member_ids: &[String]) -> Result<Vec<String>, StoreError> {
        self.mutate(|state| {
            let mut removed = Vec::new();
            for member in &mut state.members {
                if !member.is_deleted() && member_ids.contains(&member.member_id) {
                    member.mark_deleted();
                    removed.push(member.member_id.clone());
                }
            }
            Ok(removed)
        })
        .await
    }

    async fn update(&self, membership: &Membership) -> Result<(), StoreError> {
        self.mutate(|state| {
            let slot = state
                .members
                .iter_mut()
                .find(|m| m.member_id == membership.member_id)
                .ok_or_else(|| StoreError::NotFound(membership.member_id.clone()))?;
            *slot = membership.clone();
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl UserDirectory for JsonStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<String>, StoreError> {
        Ok(self
            .read(|state| {
                state
                    .users
                    .iter()
                    .find(|u| &u.email == email)
                    .map(|u| u.user_id.clone())
            })
            .await)
    }
}

#[async_trait]
impl SpaceDirectory for JsonStore {
    async fn find_space(&self, space_id: &str) -> Result<Option<Space>, StoreError> {
        Ok(self
            .read(|state| state.spaces.iter().find(|s| s.space_id == space_id).cloned())
            .await)
    }
}
