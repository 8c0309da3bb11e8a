use solana_sdk::{
    derivation_path::DerivationPath,
    signature::Keypair,
    signer::keypair::{generate_seed_from_seed_phrase_and_passphrase, keypair_from_seed_and_derivation_path},
};

use crate::config::{Mnemonic, MNEMONIC_ENV, SOL_PRIVATE_KEY_ENV};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("private key is not valid base58")]
    NotBase58,
    #[error("private key is not a 64-byte keypair: {0}")]
    BadKeypair(String),
    #[error("failed to derive a keypair from the mnemonic: {0}")]
    Derivation(String),
    #[error("no Solana wallet: set {0} or {1}")]
    Missing(&'static str, &'static str),
}

/// Keypair from a base58 encoded 64-byte secret, the format wallets export.
pub fn keypair_from_base58(secret: &str) -> Result<Keypair, WalletError> {
    let bytes = bs58::decode(secret.trim())
        .into_vec()
        .map_err(|_e| WalletError::NotBase58)?;
    Keypair::try_from(bytes.as_slice()).map_err(|e| WalletError::BadKeypair(e.to_string()))
}

/// First account of the seed phrase on the `m/44'/501'/0'/0'` path.
pub fn keypair_from_mnemonic(mnemonic: &Mnemonic) -> Result<Keypair, WalletError> {
    let seed = generate_seed_from_seed_phrase_and_passphrase(mnemonic.expose(), "");
    let path = DerivationPath::new_bip44(Some(0), Some(0));
    keypair_from_seed_and_derivation_path(&seed, Some(path))
        .map_err(|e| WalletError::Derivation(e.to_string()))
}

/// A private key takes precedence over a mnemonic.
pub fn load_keypair(
    private_key: Option<&str>,
    mnemonic: Option<&Mnemonic>,
) -> Result<Keypair, WalletError> {
    match (private_key.filter(|key| !key.trim().is_empty()), mnemonic) {
        (Some(secret), _) => keypair_from_base58(secret),
        (None, Some(mnemonic)) => keypair_from_mnemonic(mnemonic),
        (None, None) => Err(WalletError::Missing(SOL_PRIVATE_KEY_ENV, MNEMONIC_ENV)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signer::Signer;

    const PHRASE: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn should_load_exported_private_key() {
        let keypair = Keypair::new();
        let exported = keypair.to_base58_string();
        let loaded = load_keypair(Some(&exported), None).unwrap();
        assert_eq!(loaded.pubkey(), keypair.pubkey());
    }

    #[test]
    fn should_reject_malformed_private_keys() {
        assert_eq!(
            keypair_from_base58("0OIl").err(),
            Some(WalletError::NotBase58)
        );
        let short = bs58::encode([7u8; 32]).into_string();
        assert!(matches!(
            keypair_from_base58(&short),
            Err(WalletError::BadKeypair(_))
        ));
    }

    #[test]
    fn should_derive_the_same_account_from_a_phrase() {
        let first = keypair_from_mnemonic(&Mnemonic::new(PHRASE)).unwrap();
        let second = keypair_from_mnemonic(&Mnemonic::new(PHRASE)).unwrap();
        assert_eq!(first.pubkey(), second.pubkey());

        let other = keypair_from_mnemonic(&Mnemonic::new(PHRASE.replace("about", "able"))).unwrap();
        assert_ne!(first.pubkey(), other.pubkey());
    }

    #[test]
    fn should_prefer_private_key_over_mnemonic() {
        let keypair = Keypair::new();
        let loaded = load_keypair(
            Some(&keypair.to_base58_string()),
            Some(&Mnemonic::new(PHRASE)),
        )
        .unwrap();
        assert_eq!(loaded.pubkey(), keypair.pubkey());

        let blank = load_keypair(Some("  "), Some(&Mnemonic::new(PHRASE))).unwrap();
        assert_eq!(
            blank.pubkey(),
            keypair_from_mnemonic(&Mnemonic::new(PHRASE)).unwrap().pubkey()
        );
    }

    #[test]
    fn should_require_some_wallet() {
        assert_eq!(
            load_keypair(None, None).err(),
            Some(WalletError::Missing(SOL_PRIVATE_KEY_ENV, MNEMONIC_ENV))
        );
    }
}
