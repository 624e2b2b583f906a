//! Conversion from engine outcomes to hyper responses.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::engine::outcome::ResponseOutcome;

pub trait OutcomeExt {
    /// Convert into a hyper response, moving headers and body across as-is.
    fn into_response(self) -> Response<Full<Bytes>>;
}

impl OutcomeExt for ResponseOutcome {
    fn into_response(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::outcome::OutcomeBuilder;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    #[tokio::test]
    async fn test_into_response_preserves_status_headers_body() {
        let response = OutcomeBuilder::new(StatusCode::NOT_FOUND)
            .header("X-Custom", "value")
            .body("not found")
            .build()
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers().get("x-custom").unwrap(), "value");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, Bytes::from("not found"));
    }

    #[test]
    fn test_into_response_empty_body() {
        let response = OutcomeBuilder::new(StatusCode::NOT_MODIFIED)
            .build()
            .into_response();
        assert_eq!(response.status(), 304);
    }
}
