//! Provider ordering and model choice within a provider

use crate::config::ProviderConfig;
use crate::core::types::{BrokerRequest, Complexity, RequestPriority};

/// Order providers by priority desc, ties broken by name then id
pub fn sort_providers(providers: &mut [ProviderConfig]) {
    providers.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.display_name().cmp(b.display_name()))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Pick the model a provider should serve a request with.
///
/// Each designation falls back to the default model, then the first listed
/// model.
pub fn select_model(
    provider: &ProviderConfig,
    request: &BrokerRequest,
    complexity: Complexity,
) -> String {
    if let Some(preferred) = request.model_preference.as_deref() {
        if provider.supports_model(preferred) {
            return preferred.to_string();
        }
    }

    let params = &request.parameters;
    let model = if request.priority == RequestPriority::Urgent || params.is_real_time() {
        provider.fast_model()
    } else if params.is_multimodal() || complexity == Complexity::Complex {
        provider.capable_model()
    } else {
        provider.default_model()
    };
    model.map(str::to_string).unwrap_or_default()
}
