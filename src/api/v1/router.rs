use super::error::ApiRejection;
use super::handler;
use crate::application_port::{AuthService, Claims};
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, http, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let register = warp::post()
        .and(warp::path("register"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::register);

    let login = warp::post()
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::login);

    let refresh = warp::post()
        .and(warp::path("refresh"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::refresh);

    let logout = warp::post()
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::logout);

    let me = warp::get()
        .and(warp::path("me"))
        .and(warp::path::end())
        .and(with_authorization(server.auth_service.clone()))
        .and_then(handler::me);

    register.or(login).or(refresh).or(logout).or(me)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_authorization(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (Claims,), Error = warp::Rejection> + Clone {
    warp::header::<String>(http::header::AUTHORIZATION.as_ref()).and_then(move |header: String| {
        let auth_service = auth_service.clone();
        async move {
            let Some(token) = header.strip_prefix("Bearer ") else {
                return Err(ApiRejection::bearer_required());
            };
            auth_service
                .authorize(token)
                .await
                .map_err(ApiRejection::from)
                .map_err(reject::custom)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::application_impl::{
        Argon2PasswordHasher, InMemorySessionStore, InMemoryUserRepo, JwtConfig, JwtHs256Codec,
        RealAuthService,
    };
    use serde_json::{Value, json};
    use std::time::Duration;
    use warp::filters::BoxedFilter;
    use warp::reply::{Reply, Response};

    fn test_routes() -> BoxedFilter<(Response,)> {
        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            Arc::new(InMemoryUserRepo::new()),
            Arc::new(Argon2PasswordHasher),
            Arc::new(JwtHs256Codec::new(JwtConfig {
                access_ttl: Duration::from_secs(900),
                refresh_ttl: Duration::from_secs(3600),
                signing_key: b"api-test-signing-key".to_vec(),
            })),
            Arc::new(InMemorySessionStore::new()),
        ));
        let server = Arc::new(Server { auth_service });
        routes(server)
            .recover(api::v1::recover_error)
            .map(|reply| Reply::into_response(reply))
            .boxed()
    }

    fn body_json(body: &[u8]) -> Value {
        serde_json::from_slice(body).expect("response body should be JSON")
    }

    async fn post(
        api: &BoxedFilter<(Response,)>,
        path: &str,
        body: Value,
    ) -> (http::StatusCode, Value) {
        let res = warp::test::request()
            .method("POST")
            .path(path)
            .json(&body)
            .reply(api)
            .await;
        (res.status(), body_json(res.body()))
    }

    #[tokio::test]
    async fn register_login_refresh_logout_flow() {
        let api = test_routes();
        let creds = json!({"email": "a@x.com", "password": "pw123456"});

        let (status, body) = post(&api, "/register", creds.clone()).await;
        assert_eq!(status, http::StatusCode::CREATED);
        assert_eq!(body["status"], "registered");

        let (status, body) = post(&api, "/login", creds).await;
        assert_eq!(status, http::StatusCode::OK);
        let refresh_token = body["refresh_token"].as_str().unwrap().to_string();
        let access_token = body["access_token"].as_str().unwrap().to_string();

        let res = warp::test::request()
            .method("GET")
            .path("/me")
            .header("authorization", format!("Bearer {}", access_token))
            .reply(&api)
            .await;
        assert_eq!(res.status(), http::StatusCode::OK);
        let me = body_json(res.body());
        assert_eq!(me["email"], "a@x.com");
        assert!(me["exp"].as_i64().unwrap() > 0);

        let (status, body) =
            post(&api, "/refresh", json!({"refresh_token": refresh_token})).await;
        assert_eq!(status, http::StatusCode::OK);
        let rotated = body["refresh_token"].as_str().unwrap().to_string();
        assert_ne!(rotated, refresh_token);

        // The redeemed token is now dead.
        let (status, body) =
            post(&api, "/refresh", json!({"refresh_token": refresh_token})).await;
        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthorized");

        let (status, body) = post(&api, "/logout", json!({"refresh_token": rotated.clone()})).await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["status"], "logged_out");

        let (status, _) = post(&api, "/refresh", json!({"refresh_token": rotated})).await;
        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_validates_input() {
        let api = test_routes();

        let (status, body) = post(&api, "/register", json!({"email": "a@x.com"})).await;
        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "bad_request");

        let (status, body) =
            post(&api, "/register", json!({"email": "", "password": ""})).await;
        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "bad_request");
    }

    #[tokio::test]
    async fn duplicate_register_conflicts() {
        let api = test_routes();
        let creds = json!({"email": "a@x.com", "password": "pw123456"});
        post(&api, "/register", creds.clone()).await;

        let (status, body) = post(&api, "/register", creds).await;
        assert_eq!(status, http::StatusCode::CONFLICT);
        assert_eq!(body["code"], "conflict");
    }

    #[tokio::test]
    async fn bad_credentials_are_unauthorized() {
        let api = test_routes();
        post(
            &api,
            "/register",
            json!({"email": "a@x.com", "password": "pw123456"}),
        )
        .await;

        for creds in [
            json!({"email": "a@x.com", "password": "wrong"}),
            json!({"email": "nobody@x.com", "password": "pw123456"}),
        ] {
            let (status, body) = post(&api, "/login", creds).await;
            assert_eq!(status, http::StatusCode::UNAUTHORIZED);
            assert_eq!(body["code"], "unauthorized");
            assert_eq!(body["message"], "unauthorized");
        }
    }

    #[tokio::test]
    async fn refresh_and_logout_require_a_token_value() {
        let api = test_routes();
        for path in ["/refresh", "/logout"] {
            let (status, body) = post(&api, path, json!({"refresh_token": ""})).await;
            assert_eq!(status, http::StatusCode::BAD_REQUEST);
            assert_eq!(body["code"], "bad_request");

            let (status, _) = post(&api, path, json!({})).await;
            assert_eq!(status, http::StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn logout_accepts_garbage_tokens() {
        let api = test_routes();
        let (status, body) = post(&api, "/logout", json!({"refresh_token": "not.a.jwt"})).await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["status"], "logged_out");
    }

    #[tokio::test]
    async fn me_requires_a_valid_bearer() {
        let api = test_routes();

        let res = warp::test::request().method("GET").path("/me").reply(&api).await;
        assert_eq!(res.status(), http::StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(res.body())["code"], "unauthorized");

        let res = warp::test::request()
            .method("GET")
            .path("/me")
            .header("authorization", "Token abc")
            .reply(&api)
            .await;
        assert_eq!(res.status(), http::StatusCode::UNAUTHORIZED);

        let res = warp::test::request()
            .method("GET")
            .path("/me")
            .header("authorization", "Bearer not.a.jwt")
            .reply(&api)
            .await;
        assert_eq!(res.status(), http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_method_is_rejected() {
        let api = test_routes();
        let res = warp::test::request().method("GET").path("/login").reply(&api).await;
        assert_eq!(res.status(), http::StatusCode::METHOD_NOT_ALLOWED);
    }
}
