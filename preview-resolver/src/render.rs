use crate::config::RenderServiceConfig;
use crate::error::PreviewError;
use serde_json::Value;

// Fixed capture parameters. The viewport matches the Open Graph card
// aspect ratio; `wait_for` blocks the capture until the page inserts its
// ready marker element.
const FORMAT: &str = "jpeg";
const WIDTH: u32 = 824;
const HEIGHT: u32 = 412;
const WAIT_FOR: &str = "#ready";

/// Submits render targets to the external screenshot service, or falls back
/// to a static placeholder when no service is configured.
pub struct Renderer {
    http: reqwest::Client,
    service: Option<RenderServiceConfig>,
    base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub url: String,
}

impl Renderer {
    pub fn new(service: Option<RenderServiceConfig>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            service,
            base_url: base_url.into(),
        }
    }

    pub async fn render(&self, target_url: &str) -> Result<RenderedImage, PreviewError> {
        let Some(service) = &self.service else {
            // Degraded mode for local/dev use: stable but non-representative.
            tracing::debug!("no render service configured, using placeholder");
            return Ok(RenderedImage {
                url: format!(
                    "{}/static/placeholder.png?url={target_url}",
                    self.base_url
                ),
            });
        };

        let form = reqwest::multipart::Form::new()
            .text("url", target_url.to_string())
            .text("format", FORMAT)
            .text("width", WIDTH.to_string())
            .text("height", HEIGHT.to_string())
            .text("fresh", "true")
            .text("wait_for", WAIT_FOR)
            .text("full_page", "true")
            .text("response_type", "json")
            .text("access_key", service.access_key.clone());

        let request_failed = |source: reqwest::Error| PreviewError::RenderRequestFailed {
            target: target_url.to_string(),
            source,
        };
        let body: Value = self
            .http
            .post(service.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(request_failed)?
            .error_for_status()
            .map_err(request_failed)?
            .json()
            .await
            .map_err(request_failed)?;

        match body.get("url").and_then(Value::as_str) {
            Some(url) => Ok(RenderedImage {
                url: url.to_string(),
            }),
            None => Err(PreviewError::RenderServiceMalformedResponse {
                body: redact(&service.access_key, &body.to_string()),
            }),
        }
    }

    /// Strips the configured access credential out of text destined for
    /// errors or logs.
    pub fn redact(&self, text: &str) -> String {
        match &self.service {
            Some(service) => redact(&service.access_key, text),
            None => text.to_string(),
        }
    }
}

fn redact(secret: &str, text: &str) -> String {
    text.replace(secret, "ACCESS_KEY")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use url::Url;

    fn configured(endpoint: &str) -> Renderer {
        Renderer::new(
            Some(RenderServiceConfig {
                endpoint: Url::parse(endpoint).unwrap(),
                access_key: "super-secret".into(),
            }),
            "https://preview.example",
        )
    }

    #[tokio::test]
    async fn fallback_when_unconfigured() {
        let renderer = Renderer::new(None, "https://preview.example");
        let rendered = renderer
            .render("https://preview.example/render/?hash=true#abc")
            .await
            .unwrap();
        assert_eq!(
            rendered.url,
            "https://preview.example/static/placeholder.png?url=https://preview.example/render/?hash=true#abc"
        );
    }

    #[tokio::test]
    async fn submits_fixed_parameters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/take")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("name=\"format\"[^-]*jpeg".into()),
                Matcher::Regex("name=\"width\"[^-]*824".into()),
                Matcher::Regex("name=\"height\"[^-]*412".into()),
                Matcher::Regex("name=\"wait_for\"[^-]*#ready".into()),
                Matcher::Regex("name=\"access_key\"[^-]*super-secret".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(r#"{"url": "https://shots.example/result.jpg"}"#)
            .create_async()
            .await;

        let renderer = configured(&format!("{}/take", server.url()));
        let rendered = renderer.render("https://preview.example/render/#x").await.unwrap();
        assert_eq!(rendered.url, "https://shots.example/result.jpg");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_url_is_malformed_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/take")
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "quota exceeded for key super-secret"}"#)
            .create_async()
            .await;

        let renderer = configured(&format!("{}/take", server.url()));
        match renderer.render("https://preview.example/render/#x").await {
            Err(PreviewError::RenderServiceMalformedResponse { body }) => {
                // The echoed body never contains the credential.
                assert!(!body.contains("super-secret"));
                assert!(body.contains("ACCESS_KEY"));
            }
            other => panic!("expected malformed response error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_error_is_wrapped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/take")
            .with_status(503)
            .create_async()
            .await;

        let renderer = configured(&format!("{}/take", server.url()));
        match renderer.render("https://preview.example/render/#x").await {
            Err(PreviewError::RenderRequestFailed { target, source }) => {
                assert_eq!(target, "https://preview.example/render/#x");
                assert!(!source.to_string().contains("super-secret"));
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn redaction() {
        let renderer = configured("https://shots.example/take");
        assert_eq!(
            renderer.redact("https://shots.example/result.jpg?key=super-secret"),
            "https://shots.example/result.jpg?key=ACCESS_KEY"
        );
    }
}
