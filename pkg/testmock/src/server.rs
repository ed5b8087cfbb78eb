use axum::{
    Router,
    http::Method,
    middleware,
    routing::{MethodRouter, any},
};
use common::{Now, SystemNow};
use oauth::WELL_KNOWN_PATH;
use setup::middleware::TracingHttpServiceLayer;
use std::{marker::PhantomData, net::SocketAddr, sync::Arc};
use tokio::{
    net::{TcpListener, ToSocketAddrs},
    sync::oneshot,
    task::JoinHandle,
};
use tracing::info;

use crate::{
    error::MockError,
    handlers::{AUTH_PATH, TOKEN_PATH, assert_method, authorize, not_found, token, well_known},
    signing::TokenIssuer,
};

/// Builds and launches mock provider servers.
///
/// `N` is the clock used for the time claims of minted tokens.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockProvider<N = SystemNow> {
    _now: PhantomData<N>,
}

impl MockProvider<SystemNow> {
    /// Launches a provider on a free port of the loopback interface.
    pub async fn spawn_on_free_port() -> Result<MockServer, MockError> {
        Self::spawn_on("127.0.0.1:0").await
    }

    /// Launches a provider on `addr`.
    pub async fn spawn_on(addr: impl ToSocketAddrs) -> Result<MockServer, MockError> {
        let listener = TcpListener::bind(addr).await.map_err(MockError::Bind)?;
        Self::launch(listener)
    }
}

impl<N: Now> MockProvider<N> {
    /// Serves the provider on an already bound listener in a background task.
    ///
    /// # Errors
    /// - the listener has no local address
    /// - the signing key cannot be loaded
    pub fn launch(listener: TcpListener) -> Result<MockServer, MockError> {
        let addr = listener.local_addr().map_err(MockError::Bind)?;
        let router = Self::router(format!("http://{addr}"))?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!(%addr, "mock provider listening");
        Ok(MockServer {
            addr,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// The provider's routes. Minted tokens name `issuer` as their issuer.
    pub fn router(issuer: String) -> Result<Router, MockError> {
        let issuer = Arc::new(TokenIssuer::<N>::new(issuer)?);

        let router = Router::new()
            .route(WELL_KNOWN_PATH, only(Method::GET, any(well_known)))
            .route(AUTH_PATH, only(Method::GET, any(authorize)))
            .route(TOKEN_PATH, only(Method::POST, any(token::<N>)))
            .fallback(not_found)
            .with_state(issuer)
            .layer(TracingHttpServiceLayer);

        Ok(router)
    }
}

fn only<S>(method: Method, route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.layer(middleware::from_fn_with_state(method, assert_method))
}

/// Handle to a running mock provider. The server stops when dropped.
#[derive(Debug)]
pub struct MockServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<std::io::Result<()>>>,
}

impl MockServer {
    /// Base URL without trailing slash, e.g. `http://127.0.0.1:4444`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// The issuer advertised in the discovery document.
    pub fn issuer(&self) -> String {
        format!("{}/", self.base_url())
    }

    /// Stops the server and waits for in-flight requests to finish.
    pub async fn shutdown(mut self) -> Result<(), MockError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await?.map_err(MockError::Serve)?;
        }
        Ok(())
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::{ALGORITHM, AUDIENCE, IdTokenClaims, TEST_PUBLIC_KEY};
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use common::mock::{MOCK_TIMESTAMP, MockNow};
    use http_body_util::BodyExt as _;
    use jsonwebtoken::{DecodingKey, Validation, decode};
    use rstest::rstest;
    use serde_json::Value;
    use tower::ServiceExt as _;

    const ISSUER: &str = "http://127.0.0.1:4444";

    fn router() -> Router {
        MockProvider::<MockNow>::router(ISSUER.to_string()).unwrap()
    }

    async fn body_string(body: Body) -> String {
        let bytes = body.collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_well_known() {
        // given
        let req = Request::get(WELL_KNOWN_PATH)
            .header(header::HOST, "127.0.0.1:4444")
            .body(Body::empty())
            .unwrap();

        // when
        let resp = router().oneshot(req).await.unwrap();

        // then
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        let document: Value = serde_json::from_str(&body_string(resp.into_body()).await).unwrap();
        assert_eq!(document["issuer"], "http://127.0.0.1:4444/");
        assert_eq!(document["token_endpoint"], "http://127.0.0.1:4444/oauth2/token");
    }

    #[tokio::test]
    async fn test_authorize_redirects_with_code() {
        // given
        let req = Request::get(
            "/oauth2/auth?response_type=code&client_id=testing&redirect_uri=http%3A%2F%2Flocalhost%3A4447%2Fcallback&state=abc",
        )
        .body(Body::empty())
        .unwrap();

        // when
        let resp = router().oneshot(req).await.unwrap();

        // then
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers()[header::LOCATION],
            "http://localhost:4447/callback?code=token-please"
        );
    }

    #[rstest]
    #[case::absent("/oauth2/auth?client_id=testing")]
    #[case::empty("/oauth2/auth?redirect_uri=")]
    #[tokio::test]
    async fn test_authorize_requires_redirect_uri(#[case] uri: &str) {
        // given
        let req = Request::get(uri).body(Body::empty()).unwrap();

        // when
        let resp = router().oneshot(req).await.unwrap();

        // then
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_string(resp.into_body()).await,
            "request missing redirect_uri parameter"
        );
    }

    #[tokio::test]
    async fn test_token() {
        // given
        let req = Request::post(TOKEN_PATH)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("grant_type=authorization_code&code=anything"))
            .unwrap();

        // when
        let resp = router().oneshot(req).await.unwrap();

        // then
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CACHE_CONTROL], "no-store");
        assert_eq!(resp.headers()[header::PRAGMA], "no-cache");
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");

        let body = body_string(resp.into_body()).await;
        assert!(body.starts_with("{\n  \"token_type\": \"Bearer\",\n  \"id_token\": "));
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["access_token"], "let-me-in");
        assert_eq!(json["refresh_token"], "another-token-please");
        assert_eq!(json["scope"], serde_json::json!(["openid"]));
        assert_eq!(json["expires_in"], 300);

        let key = DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap();
        let mut validation = Validation::new(ALGORITHM);
        validation.set_audience(&[AUDIENCE]);
        validation.set_issuer(&[ISSUER]);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        let token = decode::<IdTokenClaims>(json["id_token"].as_str().unwrap(), &key, &validation)
            .unwrap();
        assert_eq!(token.claims.sub, "someone@test");
        assert_eq!(token.claims.group, vec!["devs@test", "users@test"]);
        assert_eq!(token.claims.iat, MOCK_TIMESTAMP);
    }

    #[rstest]
    #[case::post_well_known(Method::POST, WELL_KNOWN_PATH)]
    #[case::post_auth(Method::POST, "/oauth2/auth?redirect_uri=http://x/cb")]
    #[case::get_token(Method::GET, TOKEN_PATH)]
    #[case::delete_token(Method::DELETE, TOKEN_PATH)]
    #[tokio::test]
    async fn test_method_not_allowed(#[case] method: Method, #[case] uri: &str) {
        // given
        let req = Request::builder()
            .method(method.clone())
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        // when
        let resp = router().oneshot(req).await.unwrap();

        // then
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            body_string(resp.into_body()).await,
            format!("method [{method}] not allowed for URL [{uri}]")
        );
    }

    #[tokio::test]
    async fn test_not_found() {
        // given
        let req = Request::put("/userinfo?x=1").body(Body::empty()).unwrap();

        // when
        let resp = router().oneshot(req).await.unwrap();

        // then
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_string(resp.into_body()).await,
            "URL [/userinfo?x=1] not found for [PUT]"
        );
    }

    #[tokio::test]
    async fn test_spawn_on_free_port() {
        // given
        let server = MockProvider::spawn_on_free_port().await.unwrap();

        // when
        let metadata = oauth::discover(&reqwest::Client::new(), &server.issuer())
            .await
            .unwrap();

        // then
        assert_eq!(metadata.issuer, server.issuer());
        assert_eq!(
            metadata.token_endpoint,
            format!("{}/oauth2/token", server.base_url())
        );
        server.shutdown().await.unwrap();
    }
}
