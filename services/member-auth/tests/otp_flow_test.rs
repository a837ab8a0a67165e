//! OTP 签发与验证流程测试

mod common;

use common::TestApp;
use member_auth::domain::repositories::{AccountRepository, MemberProfileRepository};
use member_auth::domain::member_profile::MemberProfile;
use member_auth::domain::services::DeliveryStatus;
use member_auth::domain::session::SessionManager;
use member_auth::error::OtpError;
use portal_config::OtpConfig;

#[tokio::test]
async fn test_fourth_request_within_window_is_rejected() {
    let app = TestApp::new();
    let otp = &app.services.otp_service;

    for _ in 0..3 {
        otp.request_code("quota@example.com").await.unwrap();
    }

    match otp.request_code("quota@example.com").await {
        Err(OtpError::QuotaExceeded { retry_after_secs }) => assert_eq!(retry_after_secs, 3600),
        other => panic!("expected quota error, got {other:?}"),
    }

    // 拒绝的请求不计数
    assert_eq!(app.store().request_count("quota@example.com").await.unwrap(), 3);
}

#[tokio::test]
async fn test_quota_is_per_identifier() {
    let app = TestApp::new();
    let otp = &app.services.otp_service;

    for _ in 0..3 {
        otp.request_code("a@example.com").await.unwrap();
    }
    assert!(otp.request_code("b@example.com").await.is_ok());
    assert!(otp.request_code("a@example.com").await.is_err());
}

#[tokio::test]
async fn test_window_restarts_on_each_accepted_request() {
    let app = TestApp::new();
    let otp = &app.services.otp_service;

    otp.request_code("roll@example.com").await.unwrap();
    app.advance_secs(1000);
    otp.request_code("roll@example.com").await.unwrap();
    app.advance_secs(1000);
    otp.request_code("roll@example.com").await.unwrap();

    // 第三次请求把窗口重置为 3600 秒
    app.advance_secs(1000);
    match otp.request_code("roll@example.com").await {
        Err(OtpError::QuotaExceeded { retry_after_secs }) => assert_eq!(retry_after_secs, 2600),
        other => panic!("expected quota error, got {other:?}"),
    }

    app.advance_secs(2600);
    assert!(otp.request_code("roll@example.com").await.is_ok());
}

#[tokio::test]
async fn test_generated_code_is_six_digits_and_emailed() {
    let app = TestApp::new();

    let issued = app
        .services
        .otp_service
        .request_code("digits@example.com")
        .await
        .unwrap();
    assert_eq!(issued.expires_in_secs, 300);
    assert_eq!(issued.delivery, DeliveryStatus::Delivered);

    let record = app.store().load_code("digits@example.com").await.unwrap().unwrap();
    assert_eq!(record.code.len(), 6);
    assert!(record.code.chars().all(|c| c.is_ascii_digit()));

    let sent = app.email.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "digits@example.com");
    assert_eq!(sent[0].template, "otp_code");
    assert_eq!(sent[0].context["code"], record.code.as_str());
}

#[tokio::test]
async fn test_email_scenario_provisions_account_and_session() {
    let app = TestApp::with_codes(&["123456"]);
    let otp = &app.services.otp_service;

    otp.request_code("user@example.com").await.unwrap();
    let login = otp.verify_code("user@example.com", "123456", None).await.unwrap();

    assert!(login.provisioned);
    assert!(!login.password_set);
    assert_eq!(login.account.id, "user@example.com");
    assert_eq!(login.account.first_name, "Visitor");
    assert!(login.account.enabled);
    assert!(app.accounts.exists("user@example.com").await.unwrap());

    let session = app.sessions.authenticate(&login.session.token).await.unwrap();
    assert_eq!(session.account_id, "user@example.com");

    assert!(app.store().load_code("user@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_non_email_scenario_logs_delivery_and_verifies() {
    let app = TestApp::with_codes(&["654321"]);
    let otp = &app.services.otp_service;

    let issued = otp.request_code("9998887777").await.unwrap();
    assert_eq!(issued.delivery, DeliveryStatus::Logged);
    assert!(app.email.sent().is_empty());

    let login = otp.verify_code("9998887777", "654321", None).await.unwrap();
    assert_eq!(login.account.id, "9998887777");
    assert_eq!(login.account.email, "9998887777@example.com");
}

#[tokio::test]
async fn test_code_is_single_use() {
    let app = TestApp::with_codes(&["111222"]);
    let otp = &app.services.otp_service;

    otp.request_code("once@example.com").await.unwrap();
    otp.verify_code("once@example.com", "111222", None).await.unwrap();

    assert!(matches!(
        otp.verify_code("once@example.com", "111222", None).await,
        Err(OtpError::NotRequested)
    ));
}

#[tokio::test]
async fn test_code_expires_after_ttl() {
    let app = TestApp::with_codes(&["333444"]);
    let otp = &app.services.otp_service;

    otp.request_code("late@example.com").await.unwrap();
    app.advance_secs(299);
    assert!(app.store().load_code("late@example.com").await.unwrap().is_some());

    app.advance_secs(1);
    assert!(matches!(
        otp.verify_code("late@example.com", "333444", None).await,
        Err(OtpError::NotRequested)
    ));
}

#[tokio::test]
async fn test_wrong_code_keeps_stored_code() {
    let app = TestApp::with_codes(&["555666"]);
    let otp = &app.services.otp_service;

    otp.request_code("typo@example.com").await.unwrap();
    assert!(matches!(
        otp.verify_code("typo@example.com", "555667", None).await,
        Err(OtpError::InvalidCode)
    ));

    let record = app.store().load_code("typo@example.com").await.unwrap().unwrap();
    assert_eq!(record.code, "555666");
    assert!(otp.verify_code("typo@example.com", "555666", None).await.is_ok());
}

#[tokio::test]
async fn test_code_discarded_after_max_wrong_attempts() {
    let app = TestApp::with_codes(&["314159"]);
    let otp = &app.services.otp_service;

    otp.request_code("guess@example.com").await.unwrap();
    for _ in 0..5 {
        assert!(matches!(
            otp.verify_code("guess@example.com", "000000", None).await,
            Err(OtpError::InvalidCode)
        ));
    }

    // 正确的验证码也不再可用
    assert!(matches!(
        otp.verify_code("guess@example.com", "314159", None).await,
        Err(OtpError::NotRequested)
    ));
    assert!(app.store().load_code("guess@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_attempts_below_limit_still_allow_login() {
    let app = TestApp::with_codes(&["271828"]);
    let otp = &app.services.otp_service;

    otp.request_code("close@example.com").await.unwrap();
    for _ in 0..4 {
        otp.verify_code("close@example.com", "000000", None).await.unwrap_err();
    }
    assert_eq!(app.store().failed_attempts("close@example.com").await.unwrap(), 4);

    assert!(otp.verify_code("close@example.com", "271828", None).await.is_ok());
}

#[tokio::test]
async fn test_fresh_code_resets_attempt_count() {
    let app = TestApp::with_codes(&["111111", "222222"]);
    let otp = &app.services.otp_service;

    otp.request_code("retry@example.com").await.unwrap();
    for _ in 0..4 {
        otp.verify_code("retry@example.com", "000000", None).await.unwrap_err();
    }

    otp.request_code("retry@example.com").await.unwrap();
    for _ in 0..4 {
        otp.verify_code("retry@example.com", "000000", None).await.unwrap_err();
    }
    assert!(otp.verify_code("retry@example.com", "222222", None).await.is_ok());
}

#[tokio::test]
async fn test_zero_attempt_limit_disables_lockout() {
    let config = OtpConfig {
        max_verify_attempts: 0,
        ..OtpConfig::default()
    };
    let app = TestApp::with_codes_and_config(&["161803"], config);
    let otp = &app.services.otp_service;

    otp.request_code("open@example.com").await.unwrap();
    for _ in 0..20 {
        otp.verify_code("open@example.com", "000000", None).await.unwrap_err();
    }
    assert!(otp.verify_code("open@example.com", "161803", None).await.is_ok());
}

#[tokio::test]
async fn test_never_requested_is_distinct_from_wrong_code() {
    let app = TestApp::new();
    assert!(matches!(
        app.services
            .otp_service
            .verify_code("nobody@example.com", "000000", None)
            .await,
        Err(OtpError::NotRequested)
    ));
}

#[tokio::test]
async fn test_uniform_auth_errors_collapse_failures() {
    let config = OtpConfig {
        uniform_auth_errors: true,
        ..OtpConfig::default()
    };
    let app = TestApp::with_codes_and_config(&["121212"], config);
    let otp = &app.services.otp_service;

    assert!(matches!(
        otp.verify_code("u@example.com", "121212", None).await,
        Err(OtpError::Rejected)
    ));

    otp.request_code("u@example.com").await.unwrap();
    assert!(matches!(
        otp.verify_code("u@example.com", "000000", None).await,
        Err(OtpError::Rejected)
    ));
}

#[tokio::test]
async fn test_new_request_overwrites_previous_code() {
    let app = TestApp::with_codes(&["111111", "222222"]);
    let otp = &app.services.otp_service;

    otp.request_code("again@example.com").await.unwrap();
    otp.request_code("again@example.com").await.unwrap();

    assert!(matches!(
        otp.verify_code("again@example.com", "111111", None).await,
        Err(OtpError::InvalidCode)
    ));
    assert!(otp.verify_code("again@example.com", "222222", None).await.is_ok());
}

#[tokio::test]
async fn test_invalid_identifiers_rejected_without_counting() {
    let app = TestApp::new();
    let otp = &app.services.otp_service;

    assert!(matches!(otp.request_code("").await, Err(OtpError::MissingInput(_))));
    assert!(matches!(otp.request_code(" \t ").await, Err(OtpError::MissingInput(_))));
    assert_eq!(app.store().request_count(" \t ").await.unwrap(), 0);
    assert!(matches!(
        otp.request_code("broken@").await,
        Err(OtpError::InvalidIdentifier)
    ));
    assert_eq!(app.store().request_count("broken@").await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_verify_inputs() {
    let app = TestApp::new();
    let otp = &app.services.otp_service;

    assert!(matches!(
        otp.verify_code("", "123456", None).await,
        Err(OtpError::MissingInput(_))
    ));
    assert!(matches!(
        otp.verify_code("a@example.com", "", None).await,
        Err(OtpError::MissingInput(_))
    ));
    assert!(matches!(
        otp.verify_code("   ", "123456", None).await,
        Err(OtpError::MissingInput(_))
    ));
}

#[tokio::test]
async fn test_email_failure_does_not_fail_issuance() {
    let app = TestApp::with_codes(&["999000"]);
    app.email.set_failing(true);

    let issued = app
        .services
        .otp_service
        .request_code("smtp-down@example.com")
        .await
        .unwrap();

    assert!(matches!(issued.delivery, DeliveryStatus::Failed { .. }));
    let record = app.store().load_code("smtp-down@example.com").await.unwrap().unwrap();
    assert_eq!(record.code, "999000");
}

#[tokio::test]
async fn test_verify_with_password_sets_credential() {
    let app = TestApp::with_codes(&["424242"]);
    let otp = &app.services.otp_service;

    otp.request_code("pw@example.com").await.unwrap();
    let login = otp
        .verify_code("pw@example.com", "424242", Some("a-good-password"))
        .await
        .unwrap();
    assert!(login.password_set);

    let account = app
        .services
        .account_service
        .authenticate_with_password("pw@example.com", "a-good-password")
        .await
        .unwrap();
    assert_eq!(account.id, "pw@example.com");
}

#[tokio::test]
async fn test_weak_password_rejected_before_code_is_consumed() {
    let app = TestApp::with_codes(&["777888"]);
    let otp = &app.services.otp_service;

    otp.request_code("weak@example.com").await.unwrap();
    let err = otp
        .verify_code("weak@example.com", "777888", Some("short"))
        .await
        .unwrap_err();
    assert!(matches!(err, OtpError::App(ref e) if e.status_code() == 400));

    assert!(app.store().load_code("weak@example.com").await.unwrap().is_some());
    assert!(!app.accounts.exists("weak@example.com").await.unwrap());
}

#[tokio::test]
async fn test_linked_profile_resolves_to_owner_account() {
    let app = TestApp::with_codes(&["100001", "200002"]);
    let otp = &app.services.otp_service;

    otp.request_code("owner@example.com").await.unwrap();
    otp.verify_code("owner@example.com", "100001", None).await.unwrap();
    app.profiles
        .save(&MemberProfile::new("MP-0007", "owner@example.com").with_mobile("5550007777"))
        .await
        .unwrap();

    otp.request_code("5550007777").await.unwrap();
    let login = otp.verify_code("5550007777", "200002", None).await.unwrap();

    assert!(!login.provisioned);
    assert_eq!(login.account.id, "owner@example.com");
    assert!(!app.accounts.exists("5550007777").await.unwrap());
}
