use tokio::task::spawn_blocking;
use tracing::warn;

use crate::error::PresenterError;

/// bcrypt hashing, run on the blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: String) -> Result<String, PresenterError> {
        let cost = self.cost;
        Ok(spawn_blocking(move || bcrypt::hash(password, cost)).await??)
    }

    /// A malformed stored hash counts as a mismatch.
    pub async fn verify(&self, password: String, hash: String) -> Result<bool, PresenterError> {
        let outcome = spawn_blocking(move || bcrypt::verify(password, &hash)).await?;
        Ok(outcome.unwrap_or_else(|e| {
            warn!(error = %e, "stored password hash could not be checked");
            false
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hasher = PasswordHasher::new(4);
        let hash = hasher.hash("correct horse battery".into()).await.unwrap();
        assert!(hash.starts_with("$2"));
        assert!(hasher.verify("correct horse battery".into(), hash.clone()).await.unwrap());
        assert!(!hasher.verify("wrong".into(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn placeholder_hash_never_matches() {
        let hasher = PasswordHasher::new(4);
        let placeholder = "$2a$11$testhash000000000000000000000000000000000000000000000000";
        assert!(!hasher.verify("anything".into(), placeholder.into()).await.unwrap());
    }
}
