use std::fmt;

/// Opaque bearer token. Expiry is tracked by the server, never locally:
/// a 401 on use is the only invalidation signal.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
}

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Short, non-reversible label safe for logs.
    pub fn fingerprint(&self) -> String {
        let len = self.value.chars().count();
        if len <= 8 {
            return format!("***({len})");
        }
        let tail: String = self.value.chars().skip(len - 4).collect();
        format!("***{tail}({len})")
    }

    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.value)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&self.fingerprint()).finish()
    }
}
