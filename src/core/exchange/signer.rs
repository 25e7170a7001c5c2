//! Venue request signing.
//!
//! Binance signs the URL-encoded query string with HMAC-SHA256 and
//! hex-encodes the digest. Kraken signs `uri_path || SHA256(nonce ||
//! body)` with HMAC-SHA512 and base64-encodes the digest. Both return
//! plain strings rather than building the request themselves, so each
//! adapter stays in control of header placement.

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/// HMAC-SHA256 over a URL-encoded query string, hex-encoded.
pub fn binance_signature(secret: &str, query: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(query.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// HMAC-SHA512 over `uri_path || SHA256(nonce || postdata)`, base64-encoded.
pub fn kraken_signature(secret_b64: &str, uri_path: &str, nonce: &str, postdata: &str) -> String {
    let secret = base64::engine::general_purpose::STANDARD
        .decode(secret_b64)
        .expect("KRAKEN_API_SECRET must be valid base64");

    let mut sha256 = Sha256::new();
    sha256.update(nonce.as_bytes());
    sha256.update(postdata.as_bytes());
    let hashed = sha256.finalize();

    let mut mac = HmacSha512::new_from_slice(&secret).expect("HMAC accepts any key length");
    mac.update(uri_path.as_bytes());
    mac.update(&hashed);

    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binance_signature_is_deterministic_hex() {
        let sig1 = binance_signature("secret", "symbol=ETHBTC&timestamp=1");
        let sig2 = binance_signature("secret", "symbol=ETHBTC&timestamp=1");
        assert_eq!(sig1, sig2);
        assert!(sig1.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(sig1.len(), 64);
    }

    #[test]
    fn binance_signature_changes_with_query() {
        let sig1 = binance_signature("secret", "symbol=ETHBTC&timestamp=1");
        let sig2 = binance_signature("secret", "symbol=ETHBTC&timestamp=2");
        assert_ne!(sig1, sig2);
    }

    #[test]
    fn kraken_signature_is_deterministic_base64() {
        let secret = base64::engine::general_purpose::STANDARD.encode("super-secret-key");
        let sig1 = kraken_signature(&secret, "/0/private/AddOrder", "1234", "pair=XBTUSD");
        let sig2 = kraken_signature(&secret, "/0/private/AddOrder", "1234", "pair=XBTUSD");
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn kraken_signature_changes_with_nonce() {
        let secret = base64::engine::general_purpose::STANDARD.encode("super-secret-key");
        let sig1 = kraken_signature(&secret, "/0/private/AddOrder", "1234", "pair=XBTUSD");
        let sig2 = kraken_signature(&secret, "/0/private/AddOrder", "1235", "pair=XBTUSD");
        assert_ne!(sig1, sig2);
    }
}
