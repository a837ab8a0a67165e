//! Member Auth Metrics
//!
//! 业务指标记录

use metrics::counter;

/// 记录验证码请求（outcome: issued / quota_exceeded / invalid）
pub fn record_otp_request(channel: &str, outcome: &str) {
    let labels = [
        ("channel", channel.to_string()),
        ("outcome", outcome.to_string()),
    ];
    counter!("otp_requests_total", &labels).increment(1);
}

/// 记录验证码投递结果
pub fn record_otp_delivery(channel: &str, status: &str) {
    let labels = [
        ("channel", channel.to_string()),
        ("status", status.to_string()),
    ];
    counter!("otp_delivery_total", &labels).increment(1);
}

/// 记录验证码验证（outcome: success / not_requested / invalid_code / rejected / error）
pub fn record_otp_verification(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!("otp_verifications_total", &labels).increment(1);
}

/// 记录密码登录
pub fn record_password_login(success: bool) {
    let labels = [("success", success.to_string())];
    counter!("password_logins_total", &labels).increment(1);
}

/// 记录档案保存（outcome: saved / duplicate_mobile / error）
pub fn record_profile_save(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!("member_profile_saves_total", &labels).increment(1);
}
