//! Local signing of deployer transactions.

use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_core::primitives::{Address, Bytes};
use alloy_eips::eip2718::Encodable2718;
use alloy_network::TxSignerSync;
use alloy_signer_local::{MnemonicBuilder, PrivateKeySigner, coins_bip39::English};
use anyhow::{Context, Result};

/// The single deployer account.
#[derive(Debug, Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Build a wallet from a hex encoded private key (with or without `0x`).
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .context("Failed to parse deployer private key")?;
        Ok(Self { signer })
    }

    /// Derive the wallet at `m/44'/60'/0'/0/{index}` from a BIP-39 phrase.
    pub fn from_mnemonic(phrase: &str, index: u32) -> Result<Self> {
        let signer = MnemonicBuilder::<English>::default()
            .phrase(phrase.trim())
            .index(index)
            .context("Invalid mnemonic derivation index")?
            .build()
            .context("Failed to derive deployer key from mnemonic")?;
        Ok(Self { signer })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign an EIP-155 legacy transaction, returning its raw encoding for
    /// `eth_sendRawTransaction`.
    ///
    /// Legacy transactions are accepted by every EVM network we target,
    /// including dev nodes that predate EIP-1559.
    pub fn sign_transaction(&self, mut tx: TxLegacy) -> Result<Bytes> {
        let signature = self
            .signer
            .sign_transaction_sync(&mut tx)
            .context("Failed to sign transaction")?;

        let envelope = TxEnvelope::from(tx.into_signed(signature));
        Ok(envelope.encoded_2718().into())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy_consensus::Transaction;
    use alloy_core::primitives::{TxKind, U256};
    use alloy_eips::eip2718::Decodable2718;

    use super::*;

    const ANVIL_KEY_0: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ANVIL_ADDRESS_0: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

    /// Example transaction from EIP-155.
    fn eip155_example() -> TxLegacy {
        TxLegacy {
            chain_id: Some(1),
            nonce: 9,
            gas_price: 20_000_000_000,
            gas_limit: 21_000,
            to: TxKind::Call(Address::repeat_byte(0x35)),
            value: U256::from(1_000_000_000_000_000_000u64),
            input: Bytes::new(),
        }
    }

    #[test]
    fn test_wallet_from_private_key() {
        let wallet = Wallet::from_private_key(ANVIL_KEY_0).unwrap();
        assert_eq!(wallet.address(), Address::from_str(ANVIL_ADDRESS_0).unwrap());
    }

    #[test]
    fn test_wallet_from_mnemonic() {
        let wallet = Wallet::from_mnemonic(TEST_MNEMONIC, 0).unwrap();
        assert_eq!(wallet.address(), Address::from_str(ANVIL_ADDRESS_0).unwrap());

        let second = Wallet::from_mnemonic(TEST_MNEMONIC, 1).unwrap();
        assert_ne!(second.address(), wallet.address());
    }

    #[test]
    fn test_invalid_private_key() {
        assert!(Wallet::from_private_key("0x1234").is_err());
    }

    #[test]
    fn test_eip155_signed_encoding() {
        let wallet = Wallet::from_private_key(
            "0x4646464646464646464646464646464646464646464646464646464646464646",
        )
        .unwrap();

        let raw = wallet.sign_transaction(eip155_example()).unwrap();

        assert_eq!(
            hex::encode(raw),
            concat!(
                "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a7",
                "6400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a0",
                "67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83",
            )
        );
    }

    #[test]
    fn test_contract_creation_round_trips() {
        let wallet = Wallet::from_private_key(ANVIL_KEY_0).unwrap();
        let tx = TxLegacy {
            chain_id: Some(31337),
            nonce: 0,
            gas_price: 1,
            gas_limit: 100_000,
            to: TxKind::Create,
            value: U256::ZERO,
            input: Bytes::from_static(&[0x60, 0x80]),
        };

        let raw = wallet.sign_transaction(tx.clone()).unwrap();
        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap();

        assert_eq!(envelope.as_legacy().unwrap().tx(), &tx);
        assert_eq!(envelope.kind(), TxKind::Create);
    }

    #[test]
    fn test_signs_for_very_large_chain_ids() {
        let wallet = Wallet::from_private_key(ANVIL_KEY_0).unwrap();
        let chain_id = u64::MAX / 2 + 1;
        let tx = TxLegacy {
            chain_id: Some(chain_id),
            ..eip155_example()
        };

        let raw = wallet.sign_transaction(tx).unwrap();
        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap();

        assert_eq!(envelope.chain_id(), Some(chain_id));
    }
}
