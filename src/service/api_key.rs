use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use rand::rngs::OsRng;

/// 32 random bytes, base64 with `+`, `/` and `=` stripped.
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    STANDARD
        .encode(bytes)
        .chars()
        .filter(|c| !matches!(c, '+' | '/' | '='))
        .collect()
}

/// Keep the first and last four characters; short keys are hidden entirely.
pub fn mask_api_key(api_key: &str) -> String {
    let chars: Vec<char> = api_key.chars().collect();
    if chars.len() < 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_alphanumeric_and_distinct() {
        let a = generate_api_key();
        let b = generate_api_key();
        assert_ne!(a, b);
        // 44 base64 chars minus padding and stripped symbols
        assert!(a.len() >= 30 && a.len() <= 43, "{}", a.len());
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn masks_long_keys() {
        assert_eq!(mask_api_key("TEMP_SALON_KEY"), "TEMP..._KEY");
        assert_eq!(mask_api_key("12345678"), "1234...5678");
    }

    #[test]
    fn hides_short_keys() {
        assert_eq!(mask_api_key(""), "****");
        assert_eq!(mask_api_key("1234567"), "****");
    }
}
