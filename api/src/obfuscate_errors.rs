use axum::{
    body::{Body, BoxBody},
    http::Request,
    response::{IntoResponse, Response},
};
use dms_http_errors::ErrorResponseData;
use futures::future::BoxFuture;
use tower::{Layer, Service};

/// Replaces the body of 5xx, 401 and 403 responses with a generic message, so that production
/// responses do not reveal internal errors or which permission a request lacked.
#[derive(Debug, Clone, Copy)]
pub struct ObfuscateErrorLayer {
    enabled: bool,
}

impl ObfuscateErrorLayer {
    pub fn new(enabled: bool) -> ObfuscateErrorLayer {
        ObfuscateErrorLayer { enabled }
    }
}

impl<S> Layer<S> for ObfuscateErrorLayer {
    type Service = ObfuscateError<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ObfuscateError {
            inner,
            enabled: self.enabled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObfuscateError<S> {
    inner: S,
    enabled: bool,
}

fn obfuscate(res: Response) -> Response {
    let status = res.status();
    match ErrorResponseData::obfuscated(status) {
        Some(body) => (status, axum::Json(body)).into_response(),
        None => res,
    }
}

impl<S> Service<Request<Body>> for ObfuscateError<S>
where
    S: Service<Request<Body>> + Send + 'static,
    S::Future: Send + 'static,
    S::Response: IntoResponse + Send + 'static,
{
    type Response = Response<BoxBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let enabled = self.enabled;
        let fut = self.inner.call(req);
        Box::pin(async move {
            let res = fut.await?.into_response();
            if enabled {
                Ok(obfuscate(res))
            } else {
                Ok(res)
            }
        })
    }
}
