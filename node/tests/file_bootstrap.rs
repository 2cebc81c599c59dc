use std::net::SocketAddr;
use std::path::Path;

use flock_core::snapshot::encode_view;
use flock_core::{Member, View};
use flock_node::config::{
    BackendConfig, BootstrapMethod, CentralizedConfig, ProviderConfig, RpcClientConfig,
};
use flock_node::engine::RpcEngine;
use flock_node::errors::ErrorKind;
use flock_node::group::GroupClient;
use flock_node::persistence::load_view;
use flock_node::provider::ProviderArgs;
use tempfile::tempdir;

fn local() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 0))
}

fn file_backed(path: &Path, bootstrap: BootstrapMethod) -> ProviderConfig {
    ProviderConfig {
        group: BackendConfig::Centralized(CentralizedConfig::default()),
        file: Some(path.to_path_buf()),
        bootstrap,
    }
}

/// An address nothing listens on.
fn dead_address() -> String {
    let listener = std::net::TcpListener::bind(local()).unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[tokio::test]
async fn test_file_is_written_at_start_and_after_each_mutation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("group.json");

    let engine = RpcEngine::bind(local(), &RpcClientConfig::default()).await.unwrap();
    let provider = engine
        .register_provider(1, file_backed(&path, BootstrapMethod::FromSelf), ProviderArgs::default())
        .await
        .unwrap();

    let on_disk = load_view(&path).await.unwrap();
    assert_eq!(on_disk.len(), 1);
    assert!(on_disk.contains(engine.address().as_str(), 1));

    provider.join(Member::new("addrB", 2)).await.unwrap();
    provider.set_metadata("app", "demo").await.unwrap();

    let on_disk = load_view(&path).await.unwrap();
    assert_eq!(on_disk.version(), 2);
    assert_eq!(on_disk.find("addrB", 2).unwrap(), 1);
    assert_eq!(on_disk.get_metadata("app").unwrap(), "demo");
    assert_eq!(on_disk.digest(), provider.view().digest());
    assert!(!dir.path().join("group.json.tmp").exists());

    engine.finalize().await.unwrap();
}

#[tokio::test]
async fn test_restarted_provider_resumes_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("group.json");

    let first = RpcEngine::bind(local(), &RpcClientConfig::default()).await.unwrap();
    let provider = first
        .register_provider(1, file_backed(&path, BootstrapMethod::FromView), ProviderArgs::default())
        .await
        .unwrap();
    provider.join(Member::new("a", 1)).await.unwrap();
    provider.join(Member::new("b", 2)).await.unwrap();
    let digest = provider.view().digest();
    first.finalize().await.unwrap();

    let second = RpcEngine::bind(local(), &RpcClientConfig::default()).await.unwrap();
    let restarted = second
        .register_provider(1, file_backed(&path, BootstrapMethod::FromFile), ProviderArgs::default())
        .await
        .unwrap();
    let view = restarted.view();
    assert_eq!(view.digest(), digest);
    assert_eq!(view.version(), 2);

    let outcome = restarted.leave(Member::new("a", 1)).await.unwrap();
    assert_eq!(outcome.version, 3);
    assert_eq!(restarted.view().find("b", 2).unwrap(), 0);

    second.finalize().await.unwrap();
}

#[tokio::test]
async fn test_bootstrap_from_missing_file_fails() {
    let dir = tempdir().unwrap();
    let engine = RpcEngine::bind(local(), &RpcClientConfig::default()).await.unwrap();
    let config = file_backed(&dir.path().join("absent.json"), BootstrapMethod::FromFile);

    let err = engine
        .register_provider(1, config, ProviderArgs::default())
        .await
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::MalformedFile);
    assert!(!engine.registry().contains(1));
    engine.finalize().await.unwrap();
}

#[tokio::test]
async fn test_file_handle_skips_dead_candidates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("group.json");

    let engine = RpcEngine::bind(local(), &RpcClientConfig::default()).await.unwrap();
    let live = engine.address().as_str().to_string();
    let listed = View::from_members([(dead_address(), 1u16), (live.clone(), 4u16)]).unwrap();
    engine
        .register_provider(4, file_backed(&path, BootstrapMethod::FromView), ProviderArgs {
            initial_view: Some(listed),
            file: None,
        })
        .await
        .unwrap();

    let client = GroupClient::new(&RpcClientConfig::default()).unwrap();
    let handle = client.make_group_handle_from_file(&path).await.unwrap();
    let endpoint = handle.endpoint().unwrap();
    assert_eq!(endpoint.address.as_str(), live);
    assert_eq!(endpoint.provider_id, 4);
    assert_eq!(handle.num_members(), 2);

    engine.finalize().await.unwrap();
}

#[tokio::test]
async fn test_file_handle_with_no_live_candidate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("group.json");
    let listed = View::from_members([(dead_address(), 1u16), (dead_address(), 2u16)]).unwrap();
    std::fs::write(&path, encode_view(&listed).unwrap()).unwrap();

    let client = GroupClient::new(&RpcClientConfig::default()).unwrap();
    let err = client.make_group_handle_from_file(&path).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnreachableGroup);

    std::fs::write(&path, encode_view(&View::new()).unwrap()).unwrap();
    let err = client.make_group_handle_from_file(&path).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnreachableGroup);
}

#[tokio::test]
async fn test_file_handle_rejects_malformed_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("group.json");
    std::fs::write(&path, br#"{"schema_version":1,"members":[],"metadata":{},"digest":"00"}"#)
        .unwrap();

    let client = GroupClient::new(&RpcClientConfig::default()).unwrap();
    let err = client.make_group_handle_from_file(&path).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedFile);
}

#[tokio::test]
async fn test_member_list_handle_works_offline_then_connects() {
    let engine = RpcEngine::bind(local(), &RpcClientConfig::default()).await.unwrap();
    let live = engine.address().as_str().to_string();
    engine
        .register_provider(
            9,
            ProviderConfig {
                group: BackendConfig::Centralized(CentralizedConfig::default()),
                file: None,
                bootstrap: BootstrapMethod::FromSelf,
            },
            ProviderArgs::default(),
        )
        .await
        .unwrap();

    let client = GroupClient::new(&RpcClientConfig::default()).unwrap();
    let mut handle = client
        .make_group_handle_from_members([(dead_address(), 1u16), (live.clone(), 9u16)])
        .unwrap();
    assert!(handle.endpoint().is_none());
    assert_eq!(handle.num_members(), 2);
    assert_eq!(handle.find(&live, 9).unwrap(), 1);

    handle.join("addrZ", 3).await.unwrap();
    assert_eq!(handle.endpoint().unwrap().provider_id, 9);
    // Still the locally assembled list.
    assert_eq!(handle.num_members(), 2);

    assert!(handle.refresh(false).await.unwrap());
    let members: Vec<_> = handle.members().cloned().collect();
    assert_eq!(members, vec![Member::new(live.as_str(), 9), Member::new("addrZ", 3)]);

    engine.finalize().await.unwrap();
}

#[tokio::test]
async fn test_finalize_flushes_current_view() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("group.json");

    let engine = RpcEngine::bind(local(), &RpcClientConfig::default()).await.unwrap();
    let provider = engine
        .register_provider(1, file_backed(&path, BootstrapMethod::FromView), ProviderArgs::default())
        .await
        .unwrap();
    provider.join(Member::new("a", 1)).await.unwrap();
    assert_eq!(provider.file(), Some(path.as_path()));

    // Lose the file behind the provider's back.
    std::fs::remove_file(&path).unwrap();
    engine.finalize().await.unwrap();

    let on_disk = load_view(&path).await.unwrap();
    assert_eq!(on_disk.version(), 1);
    assert_eq!(on_disk.digest(), provider.view().digest());
}
