use super::*;
use std::time::Duration;
use vigil_gateway::Commitment;
use vigil_monitor::ConfigError;
use vigil_types::Pubkey;

const PROGRAM: &str = "11111111111111111111111111111112";

fn parse(raw: &str) -> NodeConfig {
    serde_json::from_str(raw).unwrap()
}

#[test]
fn test_minimal_config_defaults() {
    let config = parse(&format!(r#"{{ "program_id": "{PROGRAM}", "dca": {{ "accounts": [] }} }}"#));

    assert_eq!(config.rpc_url, "http://127.0.0.1:8899");
    assert_eq!(config.commitment, Commitment::Confirmed);
    assert_eq!(config.keypair_path, None);
    assert_eq!(config.cache, CacheConfig::File { path: None });
    assert_eq!(config.prices.scale, 1.0);
    assert_eq!(config.prices.request_timeout_secs, 10);
    assert_eq!(config.rpc().request_timeout, Duration::from_secs(30));
    assert_eq!(config.api_listen.port(), 3000);

    let controllers = config.controllers();
    assert_eq!(controllers.len(), 1);
    assert_eq!(controllers[0].kind, AccountKind::Dca);
    assert_eq!(controllers[0].tick_interval, Duration::from_secs(60));
    assert_eq!(controllers[0].cache_key, "automation_dca");
    assert_eq!(controllers[0].accounts, Some(vec![]));
}

#[test]
fn test_full_config() {
    let account = Pubkey::new([4u8; 32]);
    let token = Pubkey::new([5u8; 32]);
    let config = parse(&format!(
        r#"{{
            "rpc_url": "https://api.devnet.solana.com",
            "commitment": "finalized",
            "request_timeout_secs": 5,
            "keypair_path": "/etc/vigil/authority.json",
            "program_id": "{PROGRAM}",
            "tick_interval_secs": 30,
            "cache": {{ "backend": "memory" }},
            "prices": {{ "static": {{ "{token}": 142.5 }}, "scale": 100.0 }},
            "discriminators": {{ "auto_repay": [1, 2, 3, 4, 5, 6, 7, 8] }},
            "protection": {{ "accounts": ["{account}"], "max_concurrency": 8 }},
            "price_trade": {{ "accounts": [], "cache_key": "dip", "tick_interval_secs": 5 }}
        }}"#
    ));

    assert_eq!(config.commitment, Commitment::Finalized);
    assert_eq!(config.rpc().commitment, Commitment::Finalized);
    assert_eq!(config.rpc().request_timeout, Duration::from_secs(5));
    assert_eq!(config.cache, CacheConfig::Memory);
    assert_eq!(config.cache_path(Path::new("/data")), None);
    assert_eq!(config.prices.fixed.get(&token), Some(&142.5));
    assert_eq!(config.prices.scale, 100.0);
    assert_eq!(config.discriminators.auto_repay, [1, 2, 3, 4, 5, 6, 7, 8]);
    // Entries left out keep their defaults.
    assert_eq!(config.discriminators.mock_buy, vigil_codec::DiscriminatorTable::default().mock_buy);

    let controllers = config.controllers();
    assert_eq!(controllers.len(), 2);
    assert_eq!(controllers[0].kind, AccountKind::Protection);
    assert_eq!(controllers[0].accounts, Some(vec![account]));
    assert_eq!(controllers[0].max_concurrency, 8);
    assert_eq!(controllers[0].tick_interval, Duration::from_secs(30));
    assert_eq!(controllers[1].kind, AccountKind::PriceTrade);
    assert_eq!(controllers[1].cache_key, "dip");
    assert_eq!(controllers[1].tick_interval, Duration::from_secs(5));
}

#[test]
fn test_cache_paths() {
    let mut config = parse(&format!(r#"{{ "program_id": "{PROGRAM}" }}"#));
    assert_eq!(config.cache_path(Path::new("/data")), Some(PathBuf::from("/data/cache")));

    config.cache = CacheConfig::Rocksdb { path: Some(PathBuf::from("/var/vigil")) };
    assert_eq!(config.cache_path(Path::new("/data")), Some(PathBuf::from("/var/vigil")));
}

#[test]
fn test_rejects_bad_program_id() {
    let result: Result<NodeConfig, _> = serde_json::from_str(r#"{ "program_id": "not base58 0OIl" }"#);
    assert!(result.is_err());
}

#[test]
fn test_missing_signer_is_fatal() {
    let config = parse(&format!(r#"{{ "program_id": "{PROGRAM}", "protection": {{ "accounts": [] }} }}"#));
    let gateway: Arc<dyn ChainGateway> = Arc::new(RpcGateway::new(config.rpc(), None).unwrap());
    let err = build_controllers(&config, gateway, Arc::new(MemoryCache::new()), &ControllerMetrics::new())
        .err()
        .unwrap();
    assert_eq!(err.downcast_ref::<ConfigError>(), Some(&ConfigError::MissingSigner));
}

#[test]
fn test_missing_account_list_is_fatal() {
    let config = parse(&format!(r#"{{ "program_id": "{PROGRAM}", "dca": {{}} }}"#));
    let gateway: Arc<dyn ChainGateway> = Arc::new(RpcGateway::new(config.rpc(), Some(Arc::new(Keypair::generate()))).unwrap());
    let err = build_controllers(&config, gateway, Arc::new(MemoryCache::new()), &ControllerMetrics::new())
        .err()
        .unwrap();
    assert_eq!(
        err.downcast_ref::<ConfigError>(),
        Some(&ConfigError::MissingAccounts(AccountKind::Dca))
    );
}

#[test]
fn test_no_sections_is_fatal() {
    let config = parse(&format!(r#"{{ "program_id": "{PROGRAM}" }}"#));
    let gateway: Arc<dyn ChainGateway> = Arc::new(RpcGateway::new(config.rpc(), Some(Arc::new(Keypair::generate()))).unwrap());
    assert!(build_controllers(&config, gateway, Arc::new(MemoryCache::new()), &ControllerMetrics::new()).is_err());
}

#[test]
fn test_price_trade_gets_a_price_source() {
    let config = parse(&format!(r#"{{ "program_id": "{PROGRAM}", "price_trade": {{ "accounts": [] }} }}"#));
    let gateway: Arc<dyn ChainGateway> = Arc::new(RpcGateway::new(config.rpc(), Some(Arc::new(Keypair::generate()))).unwrap());
    let controllers =
        build_controllers(&config, gateway, Arc::new(MemoryCache::new()), &ControllerMetrics::new()).unwrap();
    assert!(controllers.contains_key(&AccountKind::PriceTrade));
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vigil.json");
    std::fs::write(&path, format!(r#"{{ "program_id": "{PROGRAM}", "api_listen": "0.0.0.0:8080" }}"#)).unwrap();

    let config = NodeConfig::load(&path).unwrap();
    assert_eq!(config.api_listen.port(), 8080);

    let missing = NodeConfig::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(missing.to_string().contains("Failed to read config"));
}
