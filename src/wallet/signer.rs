use std::path::Path;

use alloy::signers::local::{LocalSigner, PrivateKeySigner};
use anyhow::Result;

/// Parses a raw private key, prompting for it when none was given.
pub fn signer_from_key(key: Option<&str>) -> Result<PrivateKeySigner> {
    let raw = match key {
        Some(key) => key.to_string(),
        None => rpassword::prompt_password("Enter private key: ")?,
    };
    Ok(raw.trim().trim_start_matches("0x").parse()?)
}

/// Decrypts a keystore file, prompting for the password when none was given.
pub fn signer_from_keystore(path: &Path, password: Option<&str>) -> Result<PrivateKeySigner> {
    let password = match password {
        Some(password) => password.to_string(),
        None => rpassword::prompt_password("Enter keystore password: ")?,
    };
    Ok(LocalSigner::decrypt_keystore(path, password)?)
}
