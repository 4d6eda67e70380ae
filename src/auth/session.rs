use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    dev::Payload, error::ErrorInternalServerError, web, Error as ActixError, FromRequest, HttpRequest,
};
use std::future::{ready, Ready};

use crate::config::session::SessionSettings;

/// How long the CSRF state cookie set by `/login` stays valid.
const STATE_COOKIE_MINUTES: i64 = 10;

/// Session identifier carried by the session cookie, if the browser sent one.
pub struct SessionId(pub Option<String>);

impl FromRequest for SessionId {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let settings = match req.app_data::<web::Data<SessionSettings>>() {
            Some(settings) => settings,
            None => return ready(Err(ErrorInternalServerError("Session settings not found"))),
        };

        let session_id = req
            .cookie(&settings.cookie_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty());

        ready(Ok(SessionId(session_id)))
    }
}

pub fn session_cookie(settings: &SessionSettings, session_id: &str) -> Cookie<'static> {
    let max_age_secs = i64::try_from(settings.ttl_secs).unwrap_or(i64::MAX);
    Cookie::build(settings.cookie_name.clone(), session_id.to_string())
        .path("/")
        .http_only(true)
        .secure(settings.cookie_secure)
        .same_site(same_site(settings))
        .max_age(CookieDuration::seconds(max_age_secs))
        .finish()
}

pub fn state_cookie(settings: &SessionSettings, state: &str) -> Cookie<'static> {
    // Lax is enough: the provider sends the browser back with a top-level GET
    Cookie::build(settings.state_cookie_name.clone(), state.to_string())
        .path("/")
        .http_only(true)
        .secure(settings.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::minutes(STATE_COOKIE_MINUTES))
        .finish()
}

pub fn removal_cookie(name: &str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name.to_string(), "").path("/").finish();
    cookie.make_removal();
    cookie
}

/// Secure deployments serve a front-end on another site, which needs `SameSite=None`.
fn same_site(settings: &SessionSettings) -> SameSite {
    if settings.cookie_secure {
        SameSite::None
    } else {
        SameSite::Lax
    }
}
