use crate::{
    error::{GenerationError, Result},
    models::{ErrorBody, GenerationHistory, GenerationPayload, GenerationResponse, ResolvedPreset},
};
use reqwest::{Client, Response};

const FALLBACK_ERROR: &str = "Failed to generate image";

/// Talks to a running generation server and keeps the session's recent
/// results.
pub struct StudioClient {
    client: Client,
    base_url: String,
    history: GenerationHistory,
}

impl StudioClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            history: GenerationHistory::new(),
        }
    }

    pub fn history(&self) -> &GenerationHistory {
        &self.history
    }

    pub async fn generate(&mut self, payload: &GenerationPayload) -> Result<GenerationResponse> {
        let has_prompt = payload
            .prompt
            .as_deref()
            .map_or(false, |p| !p.trim().is_empty());
        if !has_prompt {
            return Err(GenerationError::InvalidInput(
                "Add a descriptive prompt to craft your scene.".into(),
            ));
        }

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(payload)
            .send()
            .await
            .map_err(|e| GenerationError::Client(format!("request failed: {}", e)))?;

        let response = Self::check_status(response).await?;

        let generated: GenerationResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Client(format!("invalid response body: {}", e)))?;

        self.history.push(generated.clone());
        Ok(generated)
    }

    pub async fn presets(&self) -> Result<Vec<ResolvedPreset>> {
        let response = self
            .client
            .get(format!("{}/api/presets", self.base_url))
            .send()
            .await
            .map_err(|e| GenerationError::Client(format!("request failed: {}", e)))?;

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| GenerationError::Client(format!("invalid response body: {}", e)))
    }

    /// Turns a non-success response into an error carrying the server's
    /// message. 4xx responses keep their bad-input classification.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| FALLBACK_ERROR.to_string());
        log::warn!("Server responded with {}: {}", status, message);

        if status.is_client_error() {
            Err(GenerationError::InvalidInput(message))
        } else {
            Err(GenerationError::Client(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generated(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "imageUrl": format!("https://img/{}.png", id),
            "width": 4096,
            "height": 2304,
            "prompt": "a copper forest"
        })
    }

    #[tokio::test]
    async fn test_generate_records_history() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({"prompt": "a copper forest", "aspectRatio": "16:9"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(generated("one")))
            .mount(&server)
            .await;

        let mut client = StudioClient::new(server.uri());
        let payload = GenerationPayload::new("a copper forest").with_aspect_ratio("16:9");
        let response = client.generate(&payload).await.unwrap();

        assert_eq!(response.image_url, "https://img/one.png");
        assert_eq!(client.history().len(), 1);
        assert_eq!(client.history().latest().unwrap().id, "one");
    }

    #[tokio::test]
    async fn test_server_error_message_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": "steps must be between 20 and 80"})),
            )
            .mount(&server)
            .await;

        let mut client = StudioClient::new(server.uri());
        let err = client
            .generate(&GenerationPayload::new("a copper forest").with_steps(5))
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), "steps must be between 20 and 80");
        assert_eq!(err.kind(), ErrorKind::BadInput);
        assert!(client.history().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_error_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let mut client = StudioClient::new(server.uri());
        let err = client
            .generate(&GenerationPayload::new("a copper forest"))
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), FALLBACK_ERROR);
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[tokio::test]
    async fn test_presets() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/presets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "label": "Hero 2:1",
                "ratio": "2:1",
                "hint": "Billboard feel",
                "width": 4096,
                "height": 2048
            }])))
            .mount(&server)
            .await;

        let presets = StudioClient::new(server.uri()).presets().await.unwrap();
        assert_eq!(presets.len(), 1);
        assert_eq!((presets[0].width, presets[0].height), (4096, 2048));
    }

    #[tokio::test]
    async fn test_presets_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let err = StudioClient::new(server.uri()).presets().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(err.public_message(), FALLBACK_ERROR);
    }

    #[tokio::test]
    async fn test_blank_prompt_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(generated("x")))
            .expect(0)
            .mount(&server)
            .await;

        let mut client = StudioClient::new(server.uri());
        let err = client
            .generate(&GenerationPayload::new("   "))
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), "Add a descriptive prompt to craft your scene.");
    }
}
