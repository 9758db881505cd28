use super::error::ApiRejection;
use crate::application_port::{AuthService, Claims, LoginInput, RegisterInput, TokenPair};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Rejection, reject};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct TokenPairResponse {
    access_token: String,
    refresh_token: String,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        TokenPairResponse {
            access_token: pair.access_token.0,
            refresh_token: pair.refresh_token.0,
        }
    }
}

#[derive(Debug, Serialize)]
struct MeResponse {
    email: String,
    exp: i64,
}

pub async fn register(
    body: RegisterRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, Rejection> {
    auth_service
        .register(RegisterInput {
            email: body.email,
            password: body.password,
        })
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::with_status(
        warp::reply::json(&StatusResponse {
            status: "registered",
        }),
        StatusCode::CREATED,
    ))
}

pub async fn login(
    body: LoginRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, Rejection> {
    let pair = auth_service
        .login(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&TokenPairResponse::from(pair)))
}

pub async fn refresh(
    body: RefreshRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, Rejection> {
    if body.refresh_token.is_empty() {
        return Err(ApiRejection::bad_request("refresh_token required"));
    }

    let pair = auth_service
        .refresh(&body.refresh_token)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&TokenPairResponse::from(pair)))
}

pub async fn logout(
    body: RefreshRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, Rejection> {
    if body.refresh_token.is_empty() {
        return Err(ApiRejection::bad_request("refresh_token required"));
    }

    auth_service
        .logout(&body.refresh_token)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&StatusResponse {
        status: "logged_out",
    }))
}

pub async fn me(claims: Claims) -> Result<impl warp::Reply, Rejection> {
    Ok(warp::reply::json(&MeResponse {
        email: claims.sub,
        exp: claims.exp,
    }))
}
