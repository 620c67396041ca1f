use rand::Rng;
use rand::distributions::Alphanumeric;
use sha2::{Digest, Sha256};

/// 랜덤 토큰 길이 (문자 수)
pub const RANDOM_TOKEN_LEN: usize = 64;

/// 추측 불가능한 랜덤 문자열 생성
/// Generate an unguessable random alphanumeric string
pub fn generate_random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// 토큰 해싱 (DB 저장용)
/// Hash a token for storage; lookups hash the supplied value the same way
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_tokens_are_alphanumeric_and_distinct() {
        let a = generate_random_token(RANDOM_TOKEN_LEN);
        let b = generate_random_token(RANDOM_TOKEN_LEN);

        assert_eq!(a.len(), RANDOM_TOKEN_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn hash_is_stable_hex_sha256() {
        let digest = hash_token("abc");
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash_token("abc"), digest);
    }
}
