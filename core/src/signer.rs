use base64::prelude::BASE64_STANDARD;
use base64::Engine;

use crate::hash::base64_hmac_sha256;
use crate::{Error, Result};

/// Sign the prehash with the given base64 encoded secret.
///
/// The secret is decoded from base64 and used as the raw HMAC-SHA256 key. The
/// digest is returned base64 encoded, which is the value of `BB-ACCESS-SIGN`.
///
/// This function is pure: the same inputs always produce the same signature.
///
/// ```
/// let signature = bitbutter_core::sign("czNjcjN0", "1000GET/v1/exchanges").unwrap();
/// assert_eq!(signature, "4mzTlAFEPGvoTP0nfUJx8dkE+aNjCYJ3VIBs0U98Jc4=");
/// ```
pub fn sign(secret: &str, prehash: &str) -> Result<String> {
    let key = BASE64_STANDARD
        .decode(secret)
        .map_err(|e| Error::secret_invalid("secret is not valid base64").with_source(e))?;

    Ok(base64_hmac_sha256(&key, prehash.as_bytes()))
}
