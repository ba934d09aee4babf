//! Tests of the JSON-RPC chain client against a loopback node.
//!
//! The node answers the handful of methods the client uses with canned values
//! and records every raw transaction it receives.
//! Run with: cargo test --test http_chain

use std::sync::{Arc, Mutex};

use alloy_consensus::{TxEnvelope, TxLegacy};
use alloy_core::primitives::{Address, B256, Bytes, TxKind, keccak256};
use alloy_eips::eip2718::Decodable2718;
use nation3_deploy::{ChainClient, HttpChain, HttpChainConfig, Wallet, chain::TxRequest};
use serde_json::{Value, json};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};
use url::Url;

const ANVIL_KEY_0: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const CHAIN_ID: u64 = 31337;
const PENDING_NONCE: u64 = 5;
const GAS_ESTIMATE: u64 = 21_000;
const GAS_PRICE: u128 = 1_000_000_000;
const CONTRACT_ADDRESS: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

fn init_test_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

#[derive(Debug, Default)]
struct NodeState {
    methods: Vec<String>,
    raw_transactions: Vec<Bytes>,
    receipt_polls: usize,
    /// Receipt polls answered with `null` before the receipt is returned.
    pending_polls: usize,
    /// Answer `eth_estimateGas` with an execution error.
    reject_estimates: bool,
}

#[derive(Debug, Clone, Default)]
struct MockNode {
    state: Arc<Mutex<NodeState>>,
}

impl MockNode {
    async fn start(&self) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let node = self.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let node = node.clone();
                tokio::spawn(async move { node.serve(stream).await });
            }
        });

        format!("http://{}", addr).parse().unwrap()
    }

    /// Answer a single HTTP request, then close the connection.
    async fn serve(&self, mut stream: TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let (body_start, content_length) = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .map(|value| value.trim().parse::<usize>().unwrap())
                    .unwrap_or(0);
                break (end + 4, length);
            }
        };

        while buf.len() < body_start + content_length {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let request: Value =
            serde_json::from_slice(&buf[body_start..body_start + content_length]).unwrap();
        let method = request["method"].as_str().unwrap_or_default().to_string();
        let params = request["params"].as_array().cloned().unwrap_or_default();

        let body = match self.respond(&method, &params) {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }),
            Err(message) => json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": { "code": -32000, "message": message }
            }),
        }
        .to_string();

        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
             content-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
    }

    fn respond(&self, method: &str, params: &[Value]) -> Result<Value, String> {
        let mut state = self.state.lock().unwrap();
        state.methods.push(method.to_string());

        match method {
            "eth_chainId" => Ok(json!(format!("{:#x}", CHAIN_ID))),
            "eth_getTransactionCount" => {
                assert_eq!(params[1], json!("pending"));
                Ok(json!(format!("{:#x}", PENDING_NONCE)))
            }
            "eth_gasPrice" => Ok(json!(format!("{:#x}", GAS_PRICE))),
            "eth_estimateGas" if state.reject_estimates => Err("execution reverted".to_string()),
            "eth_estimateGas" => Ok(json!(format!("{:#x}", GAS_ESTIMATE))),
            "eth_sendRawTransaction" => {
                let raw: Bytes = serde_json::from_value(params[0].clone()).unwrap();
                let hash = keccak256(&raw);
                state.raw_transactions.push(raw);
                Ok(json!(hash))
            }
            "eth_getTransactionReceipt" => {
                state.receipt_polls += 1;
                if state.receipt_polls <= state.pending_polls {
                    return Ok(Value::Null);
                }
                Ok(json!({
                    "transactionHash": params[0],
                    "blockNumber": "0x10",
                    "status": "0x1",
                    "contractAddress": CONTRACT_ADDRESS,
                }))
            }
            "eth_blockNumber" => Ok(json!("0x2a")),
            other => Err(format!("method {} not supported", other)),
        }
    }

    fn update(&self, f: impl FnOnce(&mut NodeState)) {
        f(&mut self.state.lock().unwrap());
    }

    fn methods(&self) -> Vec<String> {
        self.state.lock().unwrap().methods.clone()
    }

    fn receipt_polls(&self) -> usize {
        self.state.lock().unwrap().receipt_polls
    }

    /// Decoded legacy transactions, in submission order.
    fn transactions(&self) -> Vec<TxLegacy> {
        self.state
            .lock()
            .unwrap()
            .raw_transactions
            .iter()
            .map(|raw| {
                let envelope = TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap();
                envelope.as_legacy().unwrap().tx().clone()
            })
            .collect()
    }
}

fn fast_config() -> HttpChainConfig {
    HttpChainConfig {
        poll_interval_ms: 10,
        confirmation_timeout_secs: Some(5),
        ..HttpChainConfig::default()
    }
}

async fn connect(node: &MockNode, config: HttpChainConfig) -> HttpChain {
    init_test_tracing();
    let url = node.start().await;
    let wallet = Wallet::from_private_key(ANVIL_KEY_0).unwrap();
    HttpChain::connect(url, wallet, config).await.unwrap()
}

#[tokio::test]
async fn test_connect_reads_chain_id_and_deployer() {
    let node = MockNode::default();
    let chain = connect(&node, fast_config()).await;

    assert_eq!(chain.chain_id(), CHAIN_ID);
    assert_eq!(
        chain.deployer(),
        Wallet::from_private_key(ANVIL_KEY_0).unwrap().address()
    );
    assert_eq!(node.methods(), vec!["eth_chainId", "eth_getTransactionCount"]);
}

#[tokio::test]
async fn test_nonces_start_at_pending_count_and_increase() {
    let node = MockNode::default();
    let chain = connect(&node, fast_config()).await;
    let target = Address::repeat_byte(0x42);

    let create_hash = chain
        .send_transaction(TxRequest::create(Bytes::from_static(&[0x60, 0x80])))
        .await
        .unwrap();
    chain
        .send_transaction(TxRequest::call(target, Bytes::from_static(&[0x12, 0x34])))
        .await
        .unwrap();

    let txs = node.transactions();
    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0].nonce, PENDING_NONCE);
    assert_eq!(txs[1].nonce, PENDING_NONCE + 1);

    assert_eq!(txs[0].to, TxKind::Create);
    assert_eq!(txs[1].to, TxKind::Call(target));
    assert_eq!(txs[1].input, Bytes::from_static(&[0x12, 0x34]));

    for tx in &txs {
        assert_eq!(tx.chain_id, Some(CHAIN_ID));
        assert_eq!(tx.gas_price, GAS_PRICE);
    }

    let first_raw = node.state.lock().unwrap().raw_transactions[0].clone();
    assert_eq!(create_hash, keccak256(&first_raw));
}

#[tokio::test]
async fn test_gas_limit_is_padded() {
    let node = MockNode::default();
    let chain = connect(&node, fast_config()).await;
    chain
        .send_transaction(TxRequest::call(Address::ZERO, Bytes::new()))
        .await
        .unwrap();

    let padded = MockNode::default();
    let chain = connect(
        &padded,
        HttpChainConfig {
            gas_limit_multiplier_percent: 150,
            ..fast_config()
        },
    )
    .await;
    chain
        .send_transaction(TxRequest::call(Address::ZERO, Bytes::new()))
        .await
        .unwrap();

    assert_eq!(node.transactions()[0].gas_limit, 25_200);
    assert_eq!(padded.transactions()[0].gas_limit, 31_500);
}

#[tokio::test]
async fn test_failed_estimate_does_not_consume_a_nonce() {
    let node = MockNode::default();
    let chain = connect(&node, fast_config()).await;

    node.update(|state| state.reject_estimates = true);
    let result = chain
        .send_transaction(TxRequest::call(Address::ZERO, Bytes::new()))
        .await;
    assert!(result.is_err());
    assert!(node.transactions().is_empty());

    node.update(|state| state.reject_estimates = false);
    chain
        .send_transaction(TxRequest::call(Address::ZERO, Bytes::new()))
        .await
        .unwrap();

    assert_eq!(node.transactions()[0].nonce, PENDING_NONCE);
}

#[tokio::test]
async fn test_wait_for_receipt_polls_until_mined() {
    let node = MockNode::default();
    node.update(|state| state.pending_polls = 2);
    let chain = connect(&node, fast_config()).await;

    let tx_hash = B256::repeat_byte(0x11);
    let receipt = chain.wait_for_receipt(tx_hash).await.unwrap();

    assert_eq!(node.receipt_polls(), 3);
    assert_eq!(receipt.transaction_hash, tx_hash);
    assert_eq!(receipt.block_number, 16);
    assert!(receipt.success);
    assert_eq!(
        receipt.contract_address,
        Some(CONTRACT_ADDRESS.parse().unwrap())
    );
}

#[tokio::test]
async fn test_wait_for_receipt_times_out() {
    let node = MockNode::default();
    node.update(|state| state.pending_polls = usize::MAX);
    let chain = connect(
        &node,
        HttpChainConfig {
            confirmation_timeout_secs: Some(0),
            ..fast_config()
        },
    )
    .await;

    let result = chain.wait_for_receipt(B256::repeat_byte(0x22)).await;

    assert!(result.unwrap_err().to_string().contains("Timeout waiting for"));
}

#[tokio::test]
async fn test_block_number() {
    let node = MockNode::default();
    let chain = connect(&node, fast_config()).await;

    assert_eq!(chain.block_number().await.unwrap(), 42);
}
