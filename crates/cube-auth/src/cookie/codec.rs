//! Encoding of the remember-me cookie value: `u=<name>&p=<hash>`.

/// Credentials carried by the remember-me cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RememberCookie {
    /// Login name (url-encoded on the wire).
    pub name: String,
    /// Password hash as stored for the user.
    pub password_hash: String,
}

impl RememberCookie {
    pub fn new(name: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password_hash: password_hash.into(),
        }
    }

    /// Renders the cookie value.
    pub fn encode(&self) -> String {
        format!(
            "u={}&p={}",
            urlencoding::encode(&self.name),
            urlencoding::encode(&self.password_hash)
        )
    }

    /// Parses a cookie value. Returns `None` unless both fields are present
    /// and non-empty.
    pub fn decode(value: &str) -> Option<Self> {
        let mut name = None;
        let mut password_hash = None;

        for pair in value.split('&') {
            let Some((field, raw)) = pair.split_once('=') else {
                continue;
            };
            let decoded = urlencoding::decode(raw).ok()?.into_owned();
            match field {
                "u" => name = Some(decoded),
                "p" => password_hash = Some(decoded),
                _ => {}
            }
        }

        match (name, password_hash) {
            (Some(name), Some(hash)) if !name.is_empty() && !hash.is_empty() => {
                Some(Self::new(name, hash))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_url_encodes_name() {
        let cookie = RememberCookie::new("jo smith&co", "abc");
        assert_eq!(cookie.encode(), "u=jo%20smith%26co&p=abc");
        assert_eq!(RememberCookie::decode(&cookie.encode()), Some(cookie));
    }

    #[test]
    fn test_decode_ignores_unknown_fields_and_order() {
        let cookie = RememberCookie::decode("x=1&p=5ebe&u=alice").unwrap();
        assert_eq!(cookie.name, "alice");
        assert_eq!(cookie.password_hash, "5ebe");
    }

    #[test]
    fn test_decode_rejects_incomplete_values() {
        assert!(RememberCookie::decode("").is_none());
        assert!(RememberCookie::decode("u=alice").is_none());
        assert!(RememberCookie::decode("u=&p=abc").is_none());
        assert!(RememberCookie::decode("garbage").is_none());
    }
}
