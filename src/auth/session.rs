//! Session state. The backend token and user object are the only things the
//! console persists per user, under the `token` and `user` keys of the
//! encrypted cookie session.

use actix_session::Session;

use crate::api::ApiClient;
use crate::errors::AppError;
use crate::models::user::{Actor, Role, SessionUser};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
const FLASH_KEY: &str = "flash";
const FLASH_ERROR_KEY: &str = "flash_error";

/// Store a fresh login. Only login and logout write these keys.
pub fn store_login(session: &Session, token: &str, user: &SessionUser) -> Result<(), AppError> {
    session.renew();
    session
        .insert(TOKEN_KEY, token)
        .and_then(|_| session.insert(USER_KEY, user))
        .map_err(|e| AppError::Session(format!("Failed to store login: {e}")))
}

/// Replace the stored user after a profile update.
pub fn store_user(session: &Session, user: &SessionUser) -> Result<(), AppError> {
    session
        .insert(USER_KEY, user)
        .map_err(|e| AppError::Session(format!("Failed to store user: {e}")))
}

pub fn get_token(session: &Session) -> Option<String> {
    session.get::<String>(TOKEN_KEY).unwrap_or(None)
}

pub fn get_user(session: &Session) -> Option<SessionUser> {
    session.get::<SessionUser>(USER_KEY).unwrap_or(None)
}

pub fn is_logged_in(session: &Session) -> bool {
    get_token(session).is_some() && get_user(session).is_some()
}

pub fn current_user(session: &Session) -> Result<SessionUser, AppError> {
    get_user(session).ok_or(AppError::Unauthenticated)
}

pub fn current_actor(session: &Session) -> Result<Actor, AppError> {
    current_user(session).map(|u| u.actor())
}

/// The shared client, authenticated as this session.
pub fn api_for(session: &Session, base: &ApiClient) -> Result<ApiClient, AppError> {
    let token = get_token(session).ok_or(AppError::Unauthenticated)?;
    Ok(base.with_token(token))
}

pub fn has_role(session: &Session, allowed: &[Role]) -> bool {
    get_user(session).is_some_and(|u| allowed.contains(&u.role()))
}

/// Route guard: the current user must hold one of `allowed`.
pub fn require_role(session: &Session, allowed: &[Role]) -> Result<SessionUser, AppError> {
    let user = current_user(session)?;
    if allowed.contains(&user.role()) {
        Ok(user)
    } else {
        let tags: Vec<&str> = allowed.iter().map(|r| r.tag()).collect();
        Err(AppError::PermissionDenied(format!("requires role {}", tags.join("|"))))
    }
}

pub fn require_elevated(session: &Session) -> Result<SessionUser, AppError> {
    require_role(session, &[Role::Admin, Role::Manager])
}

pub fn flash(session: &Session, message: impl Into<String>) {
    let _ = session.insert(FLASH_KEY, message.into());
}

pub fn flash_error(session: &Session, message: impl Into<String>) {
    let _ = session.insert(FLASH_ERROR_KEY, message.into());
}

pub fn take_flash(session: &Session) -> Option<String> {
    take(session, FLASH_KEY)
}

pub fn take_flash_error(session: &Session) -> Option<String> {
    take(session, FLASH_ERROR_KEY)
}

fn take(session: &Session, key: &str) -> Option<String> {
    let value = session.get::<String>(key).unwrap_or(None);
    if value.is_some() {
        session.remove(key);
    }
    value
}
