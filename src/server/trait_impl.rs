use crate::metrics::{generate_request_id, OperationTimer};
use tonic::{Request, Response, Status};
use tracing::instrument;

use super::handlers;
use super::proto::membership_service_server::MembershipService;
use super::proto::*;
use super::MembershipDaemonService;

#[tonic::async_trait]
impl MembershipService for MembershipDaemonService {
    #[instrument(
        name = "grpc.invite_members",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn invite_members(
        &self,
        request: Request<InviteMembersRequest>,
    ) -> Result<Response<InviteMembersResponse>, Status> {
        let _timer = OperationTimer::new("invite_members");
        handlers::member_invite::invite_members(&self.members, self.max_emails, request.into_inner())
            .await
    }

    #[instrument(
        name = "grpc.remove_members",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn remove_members(
        &self,
        request: Request<RemoveMembersRequest>,
    ) -> Result<Response<RemoveMembersResponse>, Status> {
        let _timer = OperationTimer::new("remove_members");
        handlers::member_remove::remove_members(&self.members, request.into_inner()).await
    }

    #[instrument(
        name = "grpc.activate_member",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn activate_member(
        &self,
        request: Request<ActivateMemberRequest>,
    ) -> Result<Response<ActivateMemberResponse>, Status> {
        let _timer = OperationTimer::new("activate_member");
        handlers::member_activate::activate_member(&self.members, request.into_inner()).await
    }

    #[instrument(
        name = "grpc.get_member",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn get_member(
        &self,
        request: Request<GetMemberRequest>,
    ) -> Result<Response<GetMemberResponse>, Status> {
        let _timer = OperationTimer::new("get_member");
        handlers::member_read::get_member(&self.members, request.into_inner()).await
    }

    #[instrument(
        name = "grpc.list_members",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn list_members(
        &self,
        request: Request<ListMembersRequest>,
    ) -> Result<Response<ListMembersResponse>, Status> {
        let _timer = OperationTimer::new("list_members");
        handlers::member_read::list_members(&self.members, request.into_inner()).await
    }

    #[instrument(
        name = "grpc.list_rubbish_nodes",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn list_rubbish_nodes(
        &self,
        request: Request<ListRubbishNodesRequest>,
    ) -> Result<Response<ListRubbishNodesResponse>, Status> {
        let _timer = OperationTimer::new("list_rubbish_nodes");
        handlers::rubbish_list::list_rubbish_nodes(&self.rubbish, request.into_inner()).await
    }

    #[instrument(
        name = "grpc.recover_rubbish_node",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn recover_rubbish_node(
        &self,
        request: Request<RecoverRubbishNodeRequest>,
    ) -> Result<Response<RecoverRubbishNodeResponse>, Status> {
        let _timer = OperationTimer::new("recover_rubbish_node");
        handlers::rubbish_recover::recover_rubbish_node(&self.rubbish, request.into_inner()).await
    }

    #[instrument(
        name = "grpc.delete_rubbish_node",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn delete_rubbish_node(
        &self,
        request: Request<DeleteRubbishNodeRequest>,
    ) -> Result<Response<DeleteRubbishNodeResponse>, Status> {
        let _timer = OperationTimer::new("delete_rubbish_node");
        handlers::rubbish_delete::delete_rubbish_node(&self.rubbish, request.into_inner()).await
    }

    #[instrument(
        name = "grpc.get_daemon_info",
        skip(self, _request),
        fields(request_id = %generate_request_id())
    )]
    async fn get_daemon_info(
        &self,
        _request: Request<GetDaemonInfoRequest>,
    ) -> Result<Response<DaemonInfo>, Status> {
        let _timer = OperationTimer::new("get_daemon_info");
        handlers::daemon::get_daemon_info(&self.routes, self.data_file.as_deref()).await
    }

    #[instrument(name = "grpc.shutdown", skip(self, _request))]
    async fn shutdown(
        &self,
        _request: Request<ShutdownRequest>,
    ) -> Result<Response<ShutdownResponse>, Status> {
        handlers::daemon::shutdown(&self.shutdown_tx).await
    }
}
