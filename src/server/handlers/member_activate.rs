use crate::dto;
use crate::member::MembershipLifecycleManager;
use crate::server::convert::member_to_proto;
use crate::server::proto::{ActivateMemberRequest, ActivateMemberResponse};
use crate::server::structured_error::{to_error_json, validation_error_json};
use tonic::{Response, Status};

pub async fn activate_member(
    manager: &MembershipLifecycleManager,
    req: ActivateMemberRequest,
) -> Result<Response<ActivateMemberResponse>, Status> {
    let req = dto::ActivateMemberRequest::from(req);
    if let Err(e) = req.validate() {
        return Ok(Response::new(ActivateMemberResponse {
            success: false,
            error: validation_error_json(&req.member_id, &e),
            member: None,
        }));
    }

    match manager
        .activate_member(req.member_id.trim(), req.user_id.trim())
        .await
    {
        Ok(member) => Ok(Response::new(ActivateMemberResponse {
            success: true,
            error: String::new(),
            member: Some(member_to_proto(&member)),
        })),
        Err(e) => Ok(Response::new(ActivateMemberResponse {
            success: false,
            error: to_error_json(&req.member_id, &e),
            member: None,
        })),
    }
}
