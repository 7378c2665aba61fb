// tests/integration/local_cluster_test.rs

//! Integration tests for the standalone cluster collaborators
//! Tests: LocalMembership join probes and force leave, StaticPeerSource,
//! and a directory built from configuration

use super::test_helpers::{addrs, init_tracing, member};
use convoy::config::Config;
use convoy::core::cluster::{LocalMembership, RpcProxy, StaticPeerSource};
use convoy::core::directory::{
    ClientProxyRegistrar, ConsensusPeerSource, GossipMembership, GossipStatus,
};
use convoy::core::NodeRole;
use convoy::server::build_directory;
use std::sync::Arc;
use tokio::net::TcpListener;

fn server_config() -> Config {
    let mut config = Config::default();
    config.node_name = "alpha".to_string();
    config.server.enabled = true;
    config.server.peers = vec!["10.0.0.2:4647".to_string()];
    config
}

#[tokio::test]
async fn test_local_member_from_config() {
    let membership = LocalMembership::new(&server_config());
    let local = membership.local_member();

    assert_eq!(local.name, "alpha.global");
    assert_eq!(local.status, GossipStatus::Alive);
    assert_eq!(local.port, 4648);
    assert_eq!(local.tags.get("dc").map(String::as_str), Some("dc1"));
    assert_eq!(local.addr, Some("127.0.0.1".parse().unwrap()));
}

#[tokio::test]
async fn test_join_reachable_address_adds_member() {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let membership = LocalMembership::new(&server_config());

    let attempt = membership.join(&[address.clone()]).await;
    assert_eq!(attempt.joined, 1);
    assert!(attempt.error.is_none());

    let members = membership.members().await;
    assert_eq!(members.len(), 2);
    assert_eq!(members[1].name, address);
    assert_eq!(members[1].status, GossipStatus::Alive);
}

#[tokio::test]
async fn test_join_unreachable_address_reports_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed = listener.local_addr().unwrap().to_string();
    drop(listener);

    let open = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let reachable = open.local_addr().unwrap().to_string();

    let membership = LocalMembership::new(&server_config());
    let attempt = membership.join(&[reachable, closed.clone()]).await;

    assert_eq!(attempt.joined, 1);
    let error = attempt.error.unwrap();
    assert!(error.is_recoverable());
    assert!(error.message().starts_with("1 error(s) occurred: "));
    assert!(error.message().contains(&closed));
}

#[tokio::test]
async fn test_remove_failed_node_transitions_to_left() {
    let membership = LocalMembership::new(&server_config());
    membership.upsert(member("beta.global", GossipStatus::Alive));
    membership.upsert(member("gamma.global", GossipStatus::Leaving));

    assert!(membership.mark_failed("beta.global"));
    membership.remove_failed_node("beta.global").await.unwrap();
    membership.remove_failed_node("gamma.global").await.unwrap();

    let members = membership.members().await;
    assert_eq!(members[1].status, GossipStatus::Left);
    assert_eq!(members[2].status, GossipStatus::Left);
    assert_eq!(membership.stats()["left"], "2");
}

#[tokio::test]
async fn test_remove_alive_or_unknown_node_is_noop() {
    let membership = LocalMembership::new(&server_config());

    membership.remove_failed_node("alpha.global").await.unwrap();
    membership.remove_failed_node("nobody").await.unwrap();

    let members = membership.members().await;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].status, GossipStatus::Alive);
}

#[tokio::test]
async fn test_static_peers_start_with_local_address() {
    let peers = StaticPeerSource::new(&server_config());
    assert_eq!(
        peers.peers().await.unwrap(),
        addrs(&["127.0.0.1:4647", "10.0.0.2:4647"])
    );

    peers.set_peers(addrs(&["10.0.0.9:4647"]));
    assert_eq!(peers.peers().await.unwrap(), addrs(&["10.0.0.9:4647"]));
    assert_eq!(peers.stats()["num_peers"], "1");
}

#[test]
fn test_rpc_proxy_rejects_malformed_addresses() {
    let proxy = RpcProxy::new();
    assert!(proxy.add_server("10.0.0.1:4647"));
    assert!(!proxy.add_server("10.0.0.1"));
    assert!(!proxy.add_server("10.0.0.1:0"));
}

#[tokio::test]
async fn test_directory_from_config_both_roles() {
    let mut config = server_config();
    config.client.enabled = true;
    config.client.servers = addrs(&["10.0.0.3:4647"]);

    let directory = Arc::new(build_directory(Arc::new(config)));
    assert_eq!(directory.role(), NodeRole::Both);

    directory.register_server("10.0.0.2:4647").unwrap();
    directory.register_server("10.0.0.3:4647").unwrap();

    let servers = directory.list_servers().await.unwrap();
    assert_eq!(
        servers,
        addrs(&["127.0.0.1:4647", "10.0.0.2:4647", "10.0.0.3:4647"])
    );

    let descriptor = directory.self_descriptor();
    assert_eq!(descriptor.member.name, "alpha.global");
    assert_eq!(descriptor.stats["serf"]["members"], "1");
    assert_eq!(descriptor.stats["raft"]["num_peers"], "2");
}
