use crate::member::MembershipLifecycleManager;
use crate::server::convert::member_to_proto;
use crate::server::proto::{
    GetMemberRequest, GetMemberResponse, ListMembersRequest, ListMembersResponse,
};
use crate::server::structured_error::{to_error_json, StructuredError};
use crate::utils::is_blank;
use tonic::{Response, Status};

pub async fn get_member(
    manager: &MembershipLifecycleManager,
    req: GetMemberRequest,
) -> Result<Response<GetMemberResponse>, Status> {
    if is_blank(&req.member_id) {
        return Ok(Response::new(GetMemberResponse {
            success: false,
            error: StructuredError::new("", "VALIDATION_ERROR", "member_id: must not be blank".into())
                .to_json(),
            member: None,
        }));
    }

    match manager.get_member(req.member_id.trim()).await {
        Ok(member) => Ok(Response::new(GetMemberResponse {
            success: true,
            error: String::new(),
            member: Some(member_to_proto(&member)),
        })),
        Err(e) => Ok(Response::new(GetMemberResponse {
            success: false,
            error: to_error_json(&req.member_id, &e),
            member: None,
        })),
    }
}

pub async fn list_members(
    manager: &MembershipLifecycleManager,
    req: ListMembersRequest,
) -> Result<Response<ListMembersResponse>, Status> {
    match manager
        .list_members(req.space_id.trim(), req.include_deleted)
        .await
    {
        Ok(members) => Ok(Response::new(ListMembersResponse {
            success: true,
            error: String::new(),
            members: members.iter().map(member_to_proto).collect(),
        })),
        Err(e) => Ok(Response::new(ListMembersResponse {
            success: false,
            error: to_error_json(&req.space_id, &e),
            members: vec![],
        })),
    }
}
