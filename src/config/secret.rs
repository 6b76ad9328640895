//! Chat auth token wrapper.

use std::fmt;

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

const OAUTH_PREFIX: &str = "oauth:";

/// OAuth token for the bot account.
///
/// `Debug` never prints the value and the backing memory is wiped on drop.
#[derive(Clone, Default, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    #[cfg(test)]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Value for the `PASS` line. Tokens may be configured with or without
    /// the `oauth:` prefix.
    pub fn pass_value(&self) -> String {
        let token = self.0.trim();
        if token.starts_with(OAUTH_PREFIX) {
            token.to_string()
        } else {
            format!("{OAUTH_PREFIX}{token}")
        }
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}
