use crate::dto;
use crate::rubbish::RubbishBin;
use crate::server::convert::node_to_proto;
use crate::server::proto::{RecoverRubbishNodeRequest, RecoverRubbishNodeResponse};
use crate::server::structured_error::{to_error_json, validation_error_json};
use tonic::{Response, Status};

pub async fn recover_rubbish_node(
    bin: &RubbishBin,
    req: RecoverRubbishNodeRequest,
) -> Result<Response<RecoverRubbishNodeResponse>, Status> {
    let req = dto::NodeRecoverRequest::from(req);
    let target = match req.validate() {
        Ok(target) => target,
        Err(e) => {
            return Ok(Response::new(RecoverRubbishNodeResponse {
                success: false,
                error: validation_error_json(&req.space_id, &e),
                node: None,
            }))
        }
    };

    match bin
        .recover(
            req.space_id.trim(),
            req.member_id.trim(),
            req.user_id.trim(),
            &target,
        )
        .await
    {
        Ok(node) => Ok(Response::new(RecoverRubbishNodeResponse {
            success: true,
            error: String::new(),
            node: Some(node_to_proto(&node)),
        })),
        Err(e) => Ok(Response::new(RecoverRubbishNodeResponse {
            success: false,
            error: to_error_json(&target.node_id, &e),
            node: None,
        })),
    }
}
