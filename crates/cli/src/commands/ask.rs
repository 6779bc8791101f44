//! One-shot mode: one prompt in, one answer out, no tools.

use tachigoma_config::AppConfig;
use tachigoma_core::error::ProviderError;
use tachigoma_core::{CompletionClient, CompletionRequest, Message};
use tachigoma_providers::OpenAiCompatClient;

pub async fn run(config: &AppConfig, prompt: &str) -> Result<(), ProviderError> {
    let client = OpenAiCompatClient::from_config(config);
    let reply = ask(&client, config, prompt).await?;
    println!("{reply}");
    Ok(())
}

/// Send a single non-streaming request and return the reply text.
pub async fn ask(
    client: &dyn CompletionClient,
    config: &AppConfig,
    prompt: &str,
) -> Result<String, ProviderError> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = config.system_prompt.as_deref().filter(|s| !s.trim().is_empty()) {
        messages.push(Message::system(system));
    }
    messages.push(Message::user(prompt));

    let mut request = CompletionRequest::new(config.model.as_str(), messages);
    request.temperature = config.temperature;
    request.max_tokens = config.max_tokens;

    tracing::debug!(model = %config.model, "One-shot request");
    let reply = client.complete(request).await?;
    Ok(reply.content)
}
