use super::*;
use crate::message::{encode_compact_u16, serialize_transaction, Message, MessageError};
use crate::signer::verify_signature;
use axum::{routing::post, Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use vigil_types::{AccountMeta, Instruction};

fn key(byte: u8) -> Pubkey {
    Pubkey::new([byte; 32])
}

#[test]
fn test_compact_u16_encoding() {
    let cases: [(usize, &[u8]); 6] = [
        (0, &[0x00]),
        (127, &[0x7f]),
        (128, &[0x80, 0x01]),
        (16_383, &[0xff, 0x7f]),
        (16_384, &[0x80, 0x80, 0x01]),
        (65_535, &[0xff, 0xff, 0x03]),
    ];
    for (value, expected) in cases {
        let mut out = Vec::new();
        encode_compact_u16(&mut out, value).unwrap();
        assert_eq!(out, expected, "value {}", value);
    }
    let mut out = Vec::new();
    assert_eq!(encode_compact_u16(&mut out, 65_536), Err(MessageError::LengthOverflow(65_536)));
}

#[test]
fn test_message_orders_accounts() {
    let payer = key(1);
    let program = key(9);
    let automation = key(2);
    let readonly = key(3);
    let ix = Instruction {
        program_id: program,
        accounts: vec![
            AccountMeta::readonly(readonly, false),
            AccountMeta::writable(automation, false),
            AccountMeta::writable(payer, true),
        ],
        data: vec![1, 2, 3],
    };
    let msg = Message::compile(payer, &[ix], [5u8; 32]).unwrap();

    assert_eq!(msg.account_keys, vec![payer, automation, readonly, program]);
    assert_eq!(msg.header.num_required_signatures, 1);
    assert_eq!(msg.header.num_readonly_signed_accounts, 0);
    assert_eq!(msg.header.num_readonly_unsigned_accounts, 2);
    assert_eq!(msg.instructions[0].program_id_index, 3);
    assert_eq!(msg.instructions[0].accounts, vec![2, 1, 0]);

    let bytes = msg.serialize().unwrap();
    // header(3) + len(1) + keys(4*32) + blockhash(32) + ix count(1)
    // + program idx(1) + accounts(1+3) + data(1+3)
    assert_eq!(bytes.len(), 3 + 1 + 128 + 32 + 1 + 1 + 4 + 4);
    assert_eq!(&bytes[..4], &[1, 0, 2, 4]);
}

#[test]
fn test_message_rejects_foreign_signer() {
    let ix = Instruction {
        program_id: key(9),
        accounts: vec![AccountMeta::writable(key(4), true)],
        data: vec![],
    };
    assert_eq!(
        Message::compile(key(1), &[ix], [0u8; 32]),
        Err(MessageError::UnexpectedSigner(key(4)))
    );
}

#[test]
fn test_keypair_file_round_trip_and_signing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("id.json");
    let kp = Keypair::generate();
    kp.write_to_file(&path).unwrap();

    let loaded = Keypair::read_from_file(&path).unwrap();
    assert_eq!(loaded.pubkey(), kp.pubkey());

    let sig = loaded.sign(b"automation");
    assert!(verify_signature(&kp.pubkey(), b"automation", &sig).is_ok());
    assert!(verify_signature(&kp.pubkey(), b"tampered", &sig).is_err());
}

#[test]
fn test_keypair_rejects_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.json");
    std::fs::write(&path, "[1,2,3]").unwrap();
    assert!(matches!(Keypair::read_from_file(&path), Err(KeyError::Length(3))));

    std::fs::write(&path, "not json").unwrap();
    assert!(matches!(Keypair::read_from_file(&path), Err(KeyError::Format(_))));
}

#[tokio::test]
async fn test_static_price_source() {
    let prices = StaticPriceSource::with_prices([(key(1), 140.0)]);
    assert_eq!(prices.current_price(&key(1)).await.unwrap(), 140.0);
    assert!(matches!(
        prices.current_price(&key(2)).await,
        Err(PriceError::NoPriceAvailable(k)) if k == key(2)
    ));
    prices.set_price(key(2), 3.5);
    assert_eq!(prices.current_price(&key(2)).await.unwrap(), 3.5);
    prices.remove_price(&key(1));
    assert!(prices.current_price(&key(1)).await.is_err());
}

/// Minimal JSON-RPC node: one known account, instant confirmation, and
/// signature checks on every submitted transaction.
async fn spawn_fake_node(known: Pubkey, data: Vec<u8>, signer: Pubkey) -> String {
    let app = Router::new().route(
        "/",
        post(move |Json(req): Json<Value>| {
            let data = data.clone();
            async move {
                let id = req["id"].clone();
                let params = &req["params"];
                let result = match req["method"].as_str().unwrap_or_default() {
                    "getAccountInfo" => {
                        if params[0] == known.to_string() {
                            json!({ "context": { "slot": 1 }, "value": { "data": [BASE64.encode(&data), "base64"] } })
                        } else {
                            json!({ "context": { "slot": 1 }, "value": null })
                        }
                    }
                    "getLatestBlockhash" => json!({
                        "context": { "slot": 1 },
                        "value": { "blockhash": Pubkey::new([7u8; 32]).to_string(), "lastValidBlockHeight": 10 }
                    }),
                    "sendTransaction" => {
                        let wire = BASE64.decode(params[0].as_str().unwrap_or_default()).unwrap_or_default();
                        // shortvec(1) + 64-byte signature + message
                        let (sig, message) = (&wire[1..65], &wire[65..]);
                        if verify_signature(&signer, message, sig).is_err() {
                            return Json(json!({ "jsonrpc": "2.0", "id": id, "error": { "code": -32003, "message": "bad signature" } }));
                        }
                        json!(bs58::encode(sig).into_string())
                    }
                    "getSignatureStatuses" => json!({
                        "context": { "slot": 2 },
                        "value": [{ "err": null, "confirmationStatus": "finalized" }]
                    }),
                    _ => Value::Null,
                };
                Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_rpc_gateway_reads_and_submits() {
    let signer = Arc::new(Keypair::generate());
    let account = key(2);
    let url = spawn_fake_node(account, vec![1, 2, 3, 4], signer.pubkey()).await;

    let mut config = RpcConfig::new(url);
    config.poll_interval = Duration::from_millis(10);
    let gateway = RpcGateway::new(config, Some(signer.clone())).unwrap();

    assert_eq!(gateway.authority(), Some(signer.pubkey()));
    assert_eq!(gateway.get_account_bytes(&account).await.unwrap(), vec![1, 2, 3, 4]);
    assert!(matches!(
        gateway.get_account_bytes(&key(3)).await,
        Err(GatewayError::AccountNotFound(k)) if k == key(3)
    ));

    let ix = Instruction {
        program_id: key(9),
        accounts: vec![AccountMeta::writable(account, false), AccountMeta::writable(signer.pubkey(), true)],
        data: vec![112, 104, 176, 118, 250, 61, 48, 164],
    };
    let sig = gateway.submit_instruction(&ix).await.unwrap();
    assert!(!sig.is_empty());
}

#[tokio::test]
async fn test_rpc_gateway_without_signer() {
    let gateway = RpcGateway::new(RpcConfig::new("http://127.0.0.1:9"), None).unwrap();
    assert_eq!(gateway.authority(), None);
    let ix = Instruction { program_id: key(9), accounts: vec![], data: vec![] };
    assert!(matches!(gateway.submit_instruction(&ix).await, Err(GatewayError::MissingSigner)));
}

async fn spawn_stalled_server() -> String {
    let app = Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Json(json!({}))
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_stalled_node_times_out() {
    let url = spawn_stalled_server().await;
    let mut config = RpcConfig::new(url);
    config.request_timeout = Duration::from_millis(200);
    let gateway = RpcGateway::new(config, None).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), gateway.get_account_bytes(&key(2)))
        .await
        .expect("request should give up on its own");
    match result {
        Err(GatewayError::Http(e)) => assert!(e.is_timeout()),
        other => panic!("expected an http timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stalled_price_feed_times_out() {
    let url = spawn_stalled_server().await;
    let token = key(5);
    let source = HttpPriceSource::with_base_url(
        url,
        [(token, "solana".to_string())].into_iter().collect(),
        1.0,
        Duration::from_millis(200),
    )
    .unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), source.current_price(&token))
        .await
        .expect("request should give up on its own");
    match result {
        Err(PriceError::Http(e)) => assert!(e.is_timeout()),
        other => panic!("expected an http timeout, got {:?}", other),
    }
}

#[test]
fn test_transaction_wire_layout() {
    let wire = serialize_transaction(&[[9u8; 64]], &[1, 2, 3]).unwrap();
    assert_eq!(wire.len(), 1 + 64 + 3);
    assert_eq!(wire[0], 1);
    assert_eq!(&wire[65..], &[1, 2, 3]);
}
