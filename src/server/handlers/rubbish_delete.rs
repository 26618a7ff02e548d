use crate::dto;
use crate::rubbish::RubbishBin;
use crate::server::proto::{DeleteRubbishNodeRequest, DeleteRubbishNodeResponse};
use crate::server::structured_error::{to_error_json, validation_error_json};
use tonic::{Response, Status};

pub async fn delete_rubbish_node(
    bin: &RubbishBin,
    req: DeleteRubbishNodeRequest,
) -> Result<Response<DeleteRubbishNodeResponse>, Status> {
    let req = dto::DeleteRubbishRequest::from(req);
    if let Err(e) = req.validate() {
        return Ok(Response::new(DeleteRubbishNodeResponse {
            success: false,
            error: validation_error_json(&req.space_id, &e),
        }));
    }

    match bin
        .delete(
            req.space_id.trim(),
            req.member_id.trim(),
            req.user_id.trim(),
            req.node_id.trim(),
        )
        .await
    {
        Ok(()) => Ok(Response::new(DeleteRubbishNodeResponse {
            success: true,
            error: String::new(),
        })),
        Err(e) => Ok(Response::new(DeleteRubbishNodeResponse {
            success: false,
            error: to_error_json(&req.node_id, &e),
        })),
    }
}
