// tests/integration/control_test.rs

//! Integration tests for the cluster control operations
//! Tests: JOIN, MEMBERS, FORCE-LEAVE, SELF

use super::test_helpers::{FakeConsensus, FakeGossip, FakeRegistrar, TestContext, addrs, member};
use convoy::core::directory::{GossipStatus, JoinResult, MemberStatus};
use convoy::core::{CollaboratorError, ConvoyError, NodeRole};
use std::sync::Arc;

fn server_ctx(members: Vec<convoy::core::directory::GossipMember>) -> (TestContext, Arc<FakeGossip>) {
    let gossip = FakeGossip::new(members);
    let ctx = TestContext::server(FakeConsensus::with_peers(&["10.0.0.1:4647"]), gossip.clone());
    (ctx, gossip)
}

// ===== JOIN Tests =====

#[tokio::test]
async fn test_join_single_address() {
    let (ctx, gossip) = server_ctx(vec![member("server-1.global", GossipStatus::Alive)]);
    gossip.set_join_attempt(1, None);

    let result = ctx.directory.join(&addrs(&["10.0.0.7:4648"])).await.unwrap();
    assert_eq!(
        result,
        JoinResult {
            num_joined: 1,
            error: String::new(),
        }
    );
    assert_eq!(*gossip.joined_with.lock(), vec![addrs(&["10.0.0.7:4648"])]);
}

#[tokio::test]
async fn test_join_partial_failure_reports_count_and_error() {
    let (ctx, gossip) = server_ctx(vec![member("server-1.global", GossipStatus::Alive)]);
    gossip.set_join_attempt(
        1,
        Some(CollaboratorError::recoverable(
            "1 error(s) occurred: dial tcp 10.0.0.8:4648: connection refused",
        )),
    );

    let result = ctx
        .directory
        .join(&addrs(&["10.0.0.7:4648", "10.0.0.8:4648"]))
        .await
        .unwrap();
    assert_eq!(result.num_joined, 1);
    assert_eq!(
        result.error,
        "1 error(s) occurred: dial tcp 10.0.0.8:4648: connection refused"
    );
}

#[tokio::test]
async fn test_join_passes_entries_unchanged() {
    let (ctx, gossip) = server_ctx(vec![member("server-1.global", GossipStatus::Alive)]);
    gossip.set_join_attempt(0, Some(CollaboratorError::new("bad address")));

    let input = addrs(&["", " 10.0.0.7:4648", "10.0.0.7:4648"]);
    let result = ctx.directory.join(&input).await.unwrap();
    assert_eq!(result.num_joined, 0);
    assert_eq!(result.error, "bad address");
    assert_eq!(*gossip.joined_with.lock(), vec![input]);
}

#[tokio::test]
async fn test_join_empty_is_invalid() {
    let (ctx, gossip) = server_ctx(vec![member("server-1.global", GossipStatus::Alive)]);

    let err = ctx.directory.join(&[]).await.unwrap_err();
    assert!(matches!(err, ConvoyError::InvalidRequest(_)));
    assert!(gossip.joined_with.lock().is_empty());
}

#[tokio::test]
async fn test_join_requires_server_role() {
    let ctx = TestContext::client(FakeRegistrar::accepting());

    let err = ctx.directory.join(&addrs(&["10.0.0.7:4648"])).await.unwrap_err();
    assert_eq!(
        err,
        ConvoyError::RoleUnavailable {
            operation: "join",
            required: NodeRole::Server,
            actual: NodeRole::Client,
        }
    );

    // The role check runs before input validation.
    let none = TestContext::none();
    let err = none.directory.join(&[]).await.unwrap_err();
    assert_eq!(err.kind(), "role_unavailable");
}

// ===== MEMBERS Tests =====

#[tokio::test]
async fn test_members_preserves_order_and_fields() {
    let (ctx, _) = server_ctx(vec![
        member("server-1.global", GossipStatus::Alive),
        member("server-2.global", GossipStatus::Failed),
        member("server-3.global", GossipStatus::Leaving),
    ]);

    let nodes = ctx.directory.members().await.unwrap();
    let names: Vec<_> = nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["server-1.global", "server-2.global", "server-3.global"]);
    assert_eq!(nodes[1].status, MemberStatus::Failed);
    assert_eq!(nodes[2].status, MemberStatus::Leaving);
    assert!(nodes.iter().all(|n| n.has_consistent_versions()));
    assert_eq!(nodes[0].port, 4648);
    assert_eq!(nodes[0].tags.get("role").map(String::as_str), Some("server"));
}

#[tokio::test]
async fn test_members_empty_cluster() {
    let (ctx, _) = server_ctx(vec![]);
    assert!(ctx.directory.members().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_members_requires_server_role() {
    let ctx = TestContext::none();
    let err = ctx.directory.members().await.unwrap_err();
    assert_eq!(err.status_code(), 501);
}

// ===== FORCE-LEAVE Tests =====

#[tokio::test]
async fn test_force_leave_forwards_node_name() {
    let (ctx, gossip) = server_ctx(vec![member("server-1.global", GossipStatus::Alive)]);

    ctx.directory.force_leave("server-2.global").await.unwrap();
    assert_eq!(*gossip.removed.lock(), addrs(&["server-2.global"]));
}

#[tokio::test]
async fn test_force_leave_forwards_collaborator_error() {
    let (ctx, gossip) = server_ctx(vec![member("server-1.global", GossipStatus::Alive)]);
    gossip.set_remove_error(CollaboratorError::recoverable("node is not failed"));

    let err = ctx.directory.force_leave("server-1.global").await.unwrap_err();
    assert_eq!(err.to_string(), "node is not failed");
    assert!(err.is_recoverable());
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn test_force_leave_empty_is_invalid() {
    let (ctx, gossip) = server_ctx(vec![member("server-1.global", GossipStatus::Alive)]);

    let err = ctx.directory.force_leave("").await.unwrap_err();
    assert!(matches!(err, ConvoyError::InvalidRequest(_)));
    assert!(gossip.removed.lock().is_empty());
}

#[tokio::test]
async fn test_force_leave_requires_server_role() {
    let ctx = TestContext::client(FakeRegistrar::accepting());
    let err = ctx.directory.force_leave("server-1.global").await.unwrap_err();
    assert!(matches!(err, ConvoyError::RoleUnavailable { operation: "force_leave", .. }));
}

// ===== SELF Tests =====

#[tokio::test]
async fn test_self_on_server_reports_local_member() {
    let (ctx, _) = server_ctx(vec![member("server-1.global", GossipStatus::Alive)]);

    let descriptor = ctx.directory.self_descriptor();
    assert_eq!(descriptor.member.name, "server-1.global");
    assert_eq!(descriptor.member.status, MemberStatus::Alive);
    assert_eq!(descriptor.config.node_name, "test-node");
    assert_eq!(descriptor.stats["agent"]["role"], "server");
    assert_eq!(descriptor.stats["raft"]["state"], "Leader");
}

#[tokio::test]
async fn test_self_on_client_reports_zero_member() {
    let ctx = TestContext::client(FakeRegistrar::accepting());
    ctx.directory.register_server("10.0.0.1:4647").unwrap();

    let descriptor = ctx.directory.self_descriptor();
    assert!(descriptor.member.is_empty());
    assert_eq!(descriptor.member.status, MemberStatus::None);
    assert_eq!(descriptor.stats["directory"]["fallback_servers"], "1");
    assert!(!descriptor.stats.contains_key("raft"));
    assert!(descriptor.stats.contains_key("runtime"));
}

#[tokio::test]
async fn test_self_zero_member_serializes_null_addr() {
    let ctx = TestContext::none();
    let json = serde_json::to_value(ctx.directory.self_descriptor()).unwrap();

    assert_eq!(json["member"]["Name"], "");
    assert!(json["member"]["Addr"].is_null());
    assert_eq!(json["member"]["Status"], "none");
}
