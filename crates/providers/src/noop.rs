use crate::{GenerationOptions, Part, ProviderError, TextGenerator};

#[derive(Debug, Default)]
pub struct NoopProvider;

#[async_trait::async_trait]
impl TextGenerator for NoopProvider {
    async fn generate(
        &self,
        _parts: &[Part],
        _options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        Err(ProviderError::NotImplemented)
    }
}
