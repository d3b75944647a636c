//! Job tokens — opaque handles handed to clients.

use std::fmt;

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};

/// Length of generated tokens.
pub const TOKEN_LENGTH: usize = 16;

/// Opaque client-facing job handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "ID")]
    id: String,
}

impl Token {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Source of fresh tokens for the submission loop.
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> Token;
}

/// Draws [`TOKEN_LENGTH`] characters from `[A-Za-z0-9]` using the thread RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTokens;

impl TokenGenerator for RandomTokens {
    fn generate(&self) -> Token {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect();
        Token::new(id)
    }
}
