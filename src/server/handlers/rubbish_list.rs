use crate::dto;
use crate::rubbish::RubbishBin;
use crate::server::convert::rubbish_node_to_proto;
use crate::server::proto::{ListRubbishNodesRequest, ListRubbishNodesResponse};
use crate::server::structured_error::{to_error_json, validation_error_json};
use tonic::{Response, Status};

pub async fn list_rubbish_nodes(
    bin: &RubbishBin,
    req: ListRubbishNodesRequest,
) -> Result<Response<ListRubbishNodesResponse>, Status> {
    let req = dto::ListRubbishRequest::from(req);
    let query = match req.validate(bin.default_page_size()) {
        Ok(query) => query,
        Err(e) => {
            return Ok(Response::new(ListRubbishNodesResponse {
                success: false,
                error: validation_error_json(&req.space_id, &e),
                nodes: vec![],
            }))
        }
    };

    match bin
        .list(req.space_id.trim(), req.member_id.trim(), &query)
        .await
    {
        Ok(nodes) => Ok(Response::new(ListRubbishNodesResponse {
            success: true,
            error: String::new(),
            nodes: nodes.iter().map(rubbish_node_to_proto).collect(),
        })),
        Err(e) => Ok(Response::new(ListRubbishNodesResponse {
            success: false,
            error: to_error_json(&req.space_id, &e),
            nodes: vec![],
        })),
    }
}
