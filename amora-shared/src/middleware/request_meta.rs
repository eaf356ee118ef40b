use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

/// Client address and user agent, recorded alongside activity log rows.
/// Behind a reverse proxy the forwarded headers are authoritative; direct
/// connections fall back to "unknown" rather than failing the request.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub ip_address: String,
    pub user_agent: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

impl RequestMeta {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let ip_address = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .or_else(|| {
                headers
                    .get("x-real-ip")
                    .and_then(|v| v.to_str().ok())
                    .map(|v| v.trim().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string());

        let user_agent = headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        Self { ip_address, user_agent }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 172.16.0.2"));
        headers.insert("user-agent", HeaderValue::from_static("test-agent"));
        let meta = RequestMeta::from_headers(&headers);
        assert_eq!(meta.ip_address, "10.0.0.1");
        assert_eq!(meta.user_agent, "test-agent");
    }

    #[test]
    fn missing_headers_fall_back_to_unknown() {
        let meta = RequestMeta::from_headers(&HeaderMap::new());
        assert_eq!(meta.ip_address, "unknown");
        assert_eq!(meta.user_agent, "unknown");
    }
}
