use crate::dto;
use crate::member::{InvitationFailure, InvitationResult, Membership};
use crate::rubbish::{Node, RubbishNode};
use crate::server::proto;
use crate::server::structured_error::to_error_json;
use chrono::{DateTime, Utc};

fn ts(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

pub fn member_to_proto(member: &Membership) -> proto::Member {
    proto::Member {
        member_id: member.member_id.clone(),
        space_id: member.space_id.clone(),
        user_id: member.user_id.clone().unwrap_or_default(),
        email: member.email.to_string(),
        is_active: member.is_active(),
        is_point: member.is_point,
        status: member.status().as_str().to_string(),
        invited_by: member.invited_by.clone().unwrap_or_default(),
        created_at: ts(member.created_at),
        updated_at: ts(member.updated_at),
        deleted_at: member.deleted_at.map(ts).unwrap_or_default(),
    }
}

pub fn invitation_result_to_proto(result: &InvitationResult) -> proto::InvitationResult {
    proto::InvitationResult {
        email: result.email.to_string(),
        member_id: result.member_id.clone(),
        outcome: result.outcome.as_str().to_string(),
    }
}

pub fn invitation_failure_to_proto(failure: &InvitationFailure) -> proto::InvitationFailure {
    proto::InvitationFailure {
        email: failure.email.to_string(),
        error: to_error_json(failure.email.as_str(), &failure.error),
    }
}

pub fn node_to_proto(node: &Node) -> proto::Node {
    proto::Node {
        node_id: node.node_id.clone(),
        space_id: node.space_id.clone(),
        parent_id: node.parent_id.clone().unwrap_or_default(),
        name: node.name.clone(),
        node_type: node.node_type.as_str().to_string(),
        created_at: ts(node.created_at),
        updated_at: ts(node.updated_at),
    }
}

pub fn rubbish_node_to_proto(node: &RubbishNode) -> proto::RubbishNode {
    proto::RubbishNode {
        node_id: node.node_id.clone(),
        name: node.name.clone(),
        node_type: node.node_type.as_str().to_string(),
        deleted_at: ts(node.deleted_at),
        deleted_by: node.deleted_by.clone().unwrap_or_default(),
        over_limit: node.over_limit,
    }
}

impl From<proto::InviteMembersRequest> for dto::InviteMembersRequest {
    fn from(req: proto::InviteMembersRequest) -> Self {
        Self {
            space_id: req.space_id,
            inviter_user_id: req.inviter_user_id,
            emails: req.emails,
        }
    }
}

impl From<proto::RemoveMembersRequest> for dto::RemoveMembersRequest {
    fn from(req: proto::RemoveMembersRequest) -> Self {
        Self {
            member_ids: req.member_ids,
        }
    }
}

impl From<proto::ActivateMemberRequest> for dto::ActivateMemberRequest {
    fn from(req: proto::ActivateMemberRequest) -> Self {
        Self {
            member_id: req.member_id,
            user_id: req.user_id,
        }
    }
}

impl From<proto::ListRubbishNodesRequest> for dto::ListRubbishRequest {
    fn from(req: proto::ListRubbishNodesRequest) -> Self {
        Self {
            space_id: req.space_id,
            member_id: req.member_id,
            // proto3 has no "unset" for scalars; 0 means "use the default"
            size: (req.size != 0).then_some(req.size),
            is_over_limit: req.is_over_limit,
            last_node_id: non_empty(req.last_node_id),
        }
    }
}

impl From<proto::RecoverRubbishNodeRequest> for dto::NodeRecoverRequest {
    fn from(req: proto::RecoverRubbishNodeRequest) -> Self {
        Self {
            space_id: req.space_id,
            member_id: req.member_id,
            user_id: req.user_id,
            node_id: req.node_id,
            parent_id: non_empty(req.parent_id),
        }
    }
}

impl From<proto::DeleteRubbishNodeRequest> for dto::DeleteRubbishRequest {
    fn from(req: proto::DeleteRubbishNodeRequest) -> Self {
        Self {
            space_id: req.space_id,
            member_id: req.member_id,
            user_id: req.user_id,
            node_id: req.node_id,
        }
    }
}
