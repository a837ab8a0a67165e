//! 服务组装

use std::sync::Arc;

use portal_adapter_email::EmailSender;
use portal_config::{OtpConfig, PortalConfig};
use portal_ports::{CachePort, Clock};

use crate::application::handlers::{
    ChangePasswordHandler, GetMemberProfileHandler, LogoutHandler, PasswordLoginHandler,
    SaveMemberProfileHandler, SendOtpHandler, VerifyOtpHandler,
};
use crate::domain::account::AccountDefaults;
use crate::domain::otp::CodeGenerator;
use crate::domain::repositories::{AccountRepository, MemberProfileRepository};
use crate::domain::services::{AccountService, OtpDispatcher, OtpService, OtpStore, ProfileService};
use crate::domain::session::SessionManager;

/// 服务依赖
pub struct ServiceDependencies {
    pub cache: Arc<dyn CachePort>,
    pub accounts: Arc<dyn AccountRepository>,
    pub profiles: Arc<dyn MemberProfileRepository>,
    pub sessions: Arc<dyn SessionManager>,
    pub email_sender: Option<Arc<dyn EmailSender>>,
    pub code_generator: Arc<dyn CodeGenerator>,
    pub clock: Arc<dyn Clock>,
    pub otp: OtpConfig,
    pub portal: PortalConfig,
}

/// 组装完成的服务与处理器
pub struct ServiceContainer {
    pub otp_service: Arc<OtpService>,
    pub account_service: Arc<AccountService>,
    pub profile_service: Arc<ProfileService>,
    pub sessions: Arc<dyn SessionManager>,
    pub send_otp: SendOtpHandler,
    pub verify_otp: VerifyOtpHandler,
    pub password_login: PasswordLoginHandler,
    pub change_password: ChangePasswordHandler,
    pub logout: LogoutHandler,
    pub get_profile: GetMemberProfileHandler,
    pub save_profile: SaveMemberProfileHandler,
}

impl ServiceContainer {
    pub fn new(deps: ServiceDependencies) -> Self {
        let profile_service = Arc::new(ProfileService::new(
            deps.profiles.clone(),
            deps.accounts.clone(),
            deps.clock.clone(),
        ));

        let account_service = Arc::new(AccountService::new(
            deps.accounts.clone(),
            deps.profiles,
            AccountDefaults::from(&deps.portal),
            deps.clock.clone(),
        ));

        let dispatcher = OtpDispatcher::new(deps.email_sender)
            .with_log_code_on_failure(deps.otp.log_code_on_delivery_failure);

        let otp_service = Arc::new(OtpService::new(
            OtpStore::new(deps.cache),
            deps.code_generator,
            dispatcher,
            account_service.clone(),
            deps.sessions.clone(),
            deps.clock,
            deps.otp,
        ));

        let home_page = deps.portal.home_page;

        Self {
            send_otp: SendOtpHandler::new(otp_service.clone()),
            verify_otp: VerifyOtpHandler::new(otp_service.clone(), home_page.clone()),
            password_login: PasswordLoginHandler::new(
                account_service.clone(),
                deps.sessions.clone(),
                home_page,
            ),
            change_password: ChangePasswordHandler::new(account_service.clone(), deps.sessions.clone()),
            logout: LogoutHandler::new(deps.sessions.clone()),
            get_profile: GetMemberProfileHandler::new(
                profile_service.clone(),
                deps.accounts,
                deps.sessions.clone(),
            ),
            save_profile: SaveMemberProfileHandler::new(profile_service.clone(), deps.sessions.clone()),
            otp_service,
            account_service,
            profile_service,
            sessions: deps.sessions,
        }
    }
}
