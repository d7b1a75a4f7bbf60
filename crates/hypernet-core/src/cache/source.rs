use async_trait::async_trait;
use hypernet_types::CredentialError;

/// One network round trip producing a credential.
///
/// Implementations do not retry; [`super::CredentialCache`] owns the retry
/// policy.
#[async_trait]
pub trait CredentialSource<T: Send + 'static>: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    async fn fetch(&self) -> Result<T, CredentialError>;
}
