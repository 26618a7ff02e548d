use crate::dto;
use crate::member::MembershipLifecycleManager;
use crate::server::convert::{invitation_failure_to_proto, invitation_result_to_proto};
use crate::server::proto::{InviteMembersRequest, InviteMembersResponse};
use crate::server::structured_error::{to_error_json, validation_error_json};
use tonic::{Response, Status};

pub async fn invite_members(
    manager: &MembershipLifecycleManager,
    max_emails: usize,
    req: InviteMembersRequest,
) -> Result<Response<InviteMembersResponse>, Status> {
    let space_id = req.space_id.clone();
    let cmd = match dto::InviteMembersRequest::from(req).validate(max_emails) {
        Ok(cmd) => cmd,
        Err(e) => {
            return Ok(Response::new(InviteMembersResponse {
                success: false,
                error: validation_error_json(&space_id, &e),
                ..Default::default()
            }))
        }
    };

    match manager
        .invite_by_email(&cmd.space_id, &cmd.inviter_user_id, &cmd.emails)
        .await
    {
        // per-address failures ride along; the call itself succeeded
        Ok(report) => Ok(Response::new(InviteMembersResponse {
            success: true,
            error: String::new(),
            results: report.outcomes.iter().map(invitation_result_to_proto).collect(),
            failures: report.failures.iter().map(invitation_failure_to_proto).collect(),
        })),
        Err(e) => Ok(Response::new(InviteMembersResponse {
            success: false,
            error: to_error_json(&cmd.space_id, &e),
            ..Default::default()
        })),
    }
}
