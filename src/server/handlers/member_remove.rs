use crate::dto;
use crate::member::MembershipLifecycleManager;
use crate::server::proto::{RemoveMembersRequest, RemoveMembersResponse};
use crate::server::structured_error::{to_error_json, validation_error_json};
use tonic::{Response, Status};

pub async fn remove_members(
    manager: &MembershipLifecycleManager,
    req: RemoveMembersRequest,
) -> Result<Response<RemoveMembersResponse>, Status> {
    let ids = match dto::RemoveMembersRequest::from(req).validate() {
        Ok(ids) => ids,
        Err(e) => {
            return Ok(Response::new(RemoveMembersResponse {
                success: false,
                error: validation_error_json("", &e),
                ..Default::default()
            }))
        }
    };

    match manager.remove_members(&ids).await {
        Ok(removed) => Ok(Response::new(RemoveMembersResponse {
            success: true,
            error: String::new(),
            removed_member_ids: removed,
        })),
        Err(e) => Ok(Response::new(RemoveMembersResponse {
            success: false,
            error: to_error_json("", &e),
            ..Default::default()
        })),
    }
}
