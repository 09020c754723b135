use crate::relay::{Action, KeyDirectory, PeerMap};
use common::SharedKey;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

fn sample_bundle() -> SharedKey {
    SharedKey {
        ik_pub: "ik".to_string(),
        spk_pub: "spk".to_string(),
        signature: "sig".to_string(),
    }
}

#[test]
fn action_init_parses_from_json() {
    let json = r#"{"action":"init","user_id":"alice"}"#;
    let action: Action = serde_json::from_str(json).unwrap();
    assert!(matches!(action, Action::Init { user_id } if user_id == "alice"));
}

#[test]
fn action_register_parses_with_embedded_bundle() {
    let json = r#"{"action":"register","user_id":"alice","bundle":{"ik_pub":"ik","spk_pub":"spk","signature":"sig"}}"#;
    let action: Action = serde_json::from_str(json).unwrap();
    match action {
        Action::Register { user_id, bundle } => {
            assert_eq!(user_id, "alice");
            assert_eq!(bundle.ik_pub, "ik");
        }
        _ => panic!("expected Register"),
    }
}

#[test]
fn action_rejects_unknown_tag() {
    let json = r#"{"action":"nonsense"}"#;
    let result: Result<Action, _> = serde_json::from_str(json);
    assert!(result.is_err());
}

#[tokio::test]
async fn key_directory_registers_and_looks_up_bundles() {
    let keys: KeyDirectory = Arc::new(RwLock::new(HashMap::new()));
    keys.write().await.insert("alice".to_string(), sample_bundle());

    let found = keys.read().await.get("alice").cloned();
    assert!(found.is_some());
    assert!(keys.read().await.get("bob").is_none());
}

#[tokio::test]
async fn peer_map_tracks_connection_presence() {
    let peers: PeerMap = Arc::new(RwLock::new(HashMap::new()));
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    peers.write().await.insert("alice".to_string(), tx);

    assert!(peers.read().await.contains_key("alice"));
    peers.write().await.remove("alice");
    assert!(!peers.read().await.contains_key("alice"));
}
