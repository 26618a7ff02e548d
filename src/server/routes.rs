//! Explicit `(method, path)` table of every RPC the daemon serves.
//!
//! Built once at startup and shared with the logging layer, which tags each
//! request with its operation name and kind.

use http::Method;
use std::collections::HashMap;
use std::fmt;

/// gRPC path prefix of the membership service
pub const SERVICE_PATH: &str = "/membership.v1.MembershipService";

const REFLECTION_PATHS: [&str; 2] = [
    "/grpc.reflection.v1.ServerReflection/ServerReflectionInfo",
    "/grpc.reflection.v1alpha.ServerReflection/ServerReflectionInfo",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Reads state only
    Query,
    /// May change state
    Command,
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Command => "command",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// snake_case operation name, as used for timers and spans
    pub operation: &'static str,
    pub kind: RouteKind,
}

#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<(Method, String), Route>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route. A later registration for the same key wins.
    pub fn insert(&mut self, method: Method, path: impl Into<String>, route: Route) {
        self.routes.insert((method, path.into()), route);
    }

    /// Every RPC of the membership service plus server reflection.
    #[must_use]
    pub fn membership() -> Self {
        use RouteKind::{Command, Query};
        let rpcs = [
            ("InviteMembers", "invite_members", Command),
            ("RemoveMembers", "remove_members", Command),
            ("ActivateMember", "activate_member", Command),
            ("GetMember", "get_member", Query),
            ("ListMembers", "list_members", Query),
            ("ListRubbishNodes", "list_rubbish_nodes", Query),
            ("RecoverRubbishNode", "recover_rubbish_node", Command),
            ("DeleteRubbishNode", "delete_rubbish_node", Command),
            ("GetDaemonInfo", "get_daemon_info", Query),
            ("Shutdown", "shutdown", Command),
        ];

        let mut table = Self::new();
        for (rpc, operation, kind) in rpcs {
            table.insert(
                Method::POST,
                format!("{SERVICE_PATH}/{rpc}"),
                Route { operation, kind },
            );
        }
        for path in REFLECTION_PATHS {
            table.insert(
                Method::POST,
                path,
                Route {
                    operation: "server_reflection",
                    kind: Query,
                },
            );
        }
        table
    }

    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Option<&Route> {
        self.routes.get(&(method.clone(), path.to_string()))
    }

    /// Registered paths under [`SERVICE_PATH`], sorted.
    #[must_use]
    pub fn service_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .routes
            .keys()
            .filter(|(_, path)| path.starts_with(SERVICE_PATH))
            .map(|(_, path)| path.clone())
            .collect();
        paths.sort();
        paths
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[path = "routes_tests.rs"]
mod tests;
