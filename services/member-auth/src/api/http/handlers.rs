//! 路由处理函数

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use portal_errors::AppResult;

use super::dto::{
    ChangePasswordRequest, HealthResponse, LoginRequest, SaveProfileRequest, SendOtpRequest,
    VerifyOtpRequest,
};
use super::extract::{ApiJson, BearerToken};
use super::AppState;
use crate::application::commands::{
    ChangePasswordCommand, LoginResult, LoginWithPasswordCommand, LogoutCommand, MessageResult,
    SaveMemberProfileCommand, SaveProfileResult, SendOtpCommand, VerifyOtpCommand, VerifyOtpResult,
};
use crate::application::queries::{GetMemberProfileQuery, MemberProfileView};
use crate::application::{CommandHandler, QueryHandler};

pub async fn send_otp(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SendOtpRequest>,
) -> AppResult<Json<MessageResult>> {
    let command: SendOtpCommand = req.into();
    let result = state.services.send_otp.handle(command).await?;
    Ok(Json(result))
}

pub async fn verify_otp(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<VerifyOtpRequest>,
) -> AppResult<Json<VerifyOtpResult>> {
    let command: VerifyOtpCommand = req.into();
    let result = state.services.verify_otp.handle(command).await?;
    Ok(Json(result))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AppResult<Json<LoginResult>> {
    let command: LoginWithPasswordCommand = req.into();
    let result = state.services.password_login.handle(command).await?;
    Ok(Json(result))
}

pub async fn change_password(
    State(state): State<AppState>,
    BearerToken(access_token): BearerToken,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> AppResult<Json<MessageResult>> {
    let command = ChangePasswordCommand {
        access_token,
        new_password: req.new_password,
    };
    let result = state.services.change_password.handle(command).await?;
    Ok(Json(result))
}

pub async fn logout(
    State(state): State<AppState>,
    BearerToken(access_token): BearerToken,
) -> AppResult<Json<MessageResult>> {
    let result = state.services.logout.handle(LogoutCommand { access_token }).await?;
    Ok(Json(result))
}

pub async fn get_member_profile(
    State(state): State<AppState>,
    BearerToken(access_token): BearerToken,
) -> AppResult<Json<MemberProfileView>> {
    let result = state
        .services
        .get_profile
        .handle(GetMemberProfileQuery { access_token })
        .await?;
    Ok(Json(result))
}

pub async fn save_member_profile(
    State(state): State<AppState>,
    BearerToken(access_token): BearerToken,
    ApiJson(req): ApiJson<SaveProfileRequest>,
) -> AppResult<Json<SaveProfileResult>> {
    let command = SaveMemberProfileCommand {
        access_token,
        changes: req.try_into()?,
    };
    let result = state.services.save_profile.handle(command).await?;
    Ok(Json(result))
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}
