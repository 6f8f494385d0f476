use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;

use super::errors::TokenError;

/// JWT encoder/decoder bound to one HS256 secret.
///
/// Only establishes structure and signature. Time-based checks belong to the
/// caller, which owns the clock.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Encode claims into a signed compact JWT.
    ///
    /// # Errors
    /// * `EncodingFailed` - Claims could not be serialized or signed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Decode a token and verify its signature.
    ///
    /// Structure is established before the signature is looked at, so an
    /// undecodable token is `Malformed` whatever its signature. Registered
    /// time claims are not evaluated here.
    ///
    /// # Errors
    /// * `Malformed` - Not a three-part token, bad base64, or bad JSON
    /// * `InvalidSignature` - Signature does not verify, or the header names
    ///   a different algorithm
    pub fn decode<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, TokenError> {
        let claims = self.inspect(token)?;
        self.verify(token)?;
        Ok(claims)
    }

    /// Decode header and payload without looking at the signature.
    ///
    /// # Errors
    /// * `Malformed` - Not a three-part token, bad base64, or bad JSON
    pub fn inspect<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, TokenError> {
        let mut validation = self.validation();
        validation.insecure_disable_signature_validation();

        decode::<T>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| TokenError::Malformed(e.to_string()))
    }

    /// Check the signature of a token.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not verify, or the header names
    ///   a different algorithm
    /// * `Malformed` - Token could not be decoded
    pub fn verify(&self, token: &str) -> Result<(), TokenError> {
        decode::<serde_json::Value>(token, &self.decoding_key, &self.validation())
            .map(|_| ())
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                _ => TokenError::Malformed(e.to_string()),
            })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestClaims {
        sub: String,
        exp: i64,
    }

    fn test_claims() -> TestClaims {
        TestClaims {
            sub: "user-abc123".to_string(),
            exp: 1,
        }
    }

    #[test]
    fn test_encode_and_decode() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");

        let token = handler.encode(&test_claims()).expect("Failed to encode token");
        assert_eq!(token.split('.').count(), 3);

        // Time claims are left to the caller, so a long-past exp still decodes
        let decoded: TestClaims = handler.decode(&token).expect("Failed to decode token");
        assert_eq!(decoded, test_claims());
    }

    #[test]
    fn test_decode_invalid_token() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");

        let result = handler.decode::<TestClaims>("invalid.token.here");
        assert!(matches!(result, Err(TokenError::Malformed(_))));

        let result = handler.decode::<TestClaims>("not-a-jwt");
        assert!(matches!(result, Err(TokenError::Malformed(_))));

        let result = handler.decode::<TestClaims>("");
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_undecodable_payload_is_malformed_whatever_the_signature() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");
        let header = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";

        let garbage_payload = format!("{}.!!!not-json!!!.AAAAAAAAAAAAAAAA", header);
        let result = handler.decode::<TestClaims>(&garbage_payload);
        assert!(matches!(result, Err(TokenError::Malformed(_))));

        // {"foo":1}: valid JSON, wrong shape
        let wrong_shape = format!("{}.eyJmb28iOjF9.AAAAAAAAAAAAAAAA", header);
        let result = handler.decode::<TestClaims>(&wrong_shape);
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_inspect_ignores_signature() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!");
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!");

        let token = handler1.encode(&test_claims()).expect("Failed to encode token");

        let inspected: TestClaims = handler2.inspect(&token).unwrap();
        assert_eq!(inspected, test_claims());
        assert_eq!(handler2.verify(&token), Err(TokenError::InvalidSignature));
        assert_eq!(handler1.verify(&token), Ok(()));
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!");
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!");

        let token = handler1.encode(&test_claims()).expect("Failed to encode token");

        let result = handler2.decode::<TestClaims>(&token);
        assert_eq!(result.unwrap_err(), TokenError::InvalidSignature);
    }

    #[test]
    fn test_decode_rejects_other_algorithm() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");
        let foreign = encode(
            &Header::new(Algorithm::HS512),
            &test_claims(),
            &EncodingKey::from_secret(b"my_secret_key_at_least_32_bytes_long!"),
        )
        .unwrap();

        let result = handler.decode::<TestClaims>(&foreign);
        assert_eq!(result.unwrap_err(), TokenError::InvalidSignature);
    }
}
