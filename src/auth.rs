//! 单一管理员身份的登录与会话 cookie。
//!
//! 会话令牌不在服务端登记，[`is_valid_session`] 只检查 cookie 是否存在且非空。

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::{Rng, distr::Alphanumeric};
use serde::Deserialize;
use time::Duration;

use crate::{
    config::Config,
    error::{Error, Result},
};

/// 会话 cookie 名
pub const SESSION_COOKIE: &str = "session_id";

const SESSION_TOKEN_LEN: usize = 32;
const SESSION_TTL: Duration = Duration::hours(24);

/// 登录表单
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

struct Admin {
    username: String,
    password: String,
}

/// 管理员认证
///
/// 用户名或密码任一未配置时，[`AuthGate::authenticate`] 总是返回 `false`。
#[derive(Clone, Default)]
pub struct AuthGate {
    admin: Option<Arc<Admin>>,
}

impl AuthGate {
    pub fn new(username: Option<String>, password: Option<String>) -> Self {
        let admin = match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(Arc::new(Admin { username, password }))
            }
            _ => None,
        };
        Self { admin }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.admin_username.clone(), config.admin_password.clone())
    }

    /// 与配置的用户名、密码做精确比较
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        let Some(admin) = &self.admin else {
            tracing::error!("admin credentials not configured");
            return false;
        };

        username == admin.username && password == admin.password
    }

    /// 校验凭据并签发会话 cookie
    pub fn login(&self, jar: CookieJar, credentials: &Credentials) -> Result<CookieJar> {
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(Error::Validation("username and password are required"));
        }

        if !self.authenticate(&credentials.username, &credentials.password) {
            tracing::warn!(username = %credentials.username, "invalid admin credentials");
            return Err(Error::Unauthorized);
        }

        tracing::info!("admin session created");
        Ok(create_session(jar))
    }

    /// 已登录时注销会话
    pub fn logout(&self, jar: CookieJar) -> Result<CookieJar> {
        require_session(&jar)?;
        Ok(destroy_session(jar))
    }
}

/// 签发新的随机会话令牌，HttpOnly、Secure、SameSite=Strict，有效期 24 小时
pub fn create_session(jar: CookieJar) -> CookieJar {
    let token: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LEN)
        .map(char::from)
        .collect();

    jar.add(session_cookie(token, SESSION_TTL))
}

/// 任何非空的会话 cookie 都视为有效，令牌本身不做校验
pub fn is_valid_session(jar: &CookieJar) -> bool {
    jar.get(SESSION_COOKIE)
        .is_some_and(|cookie| !cookie.value().is_empty())
}

/// 修改类操作的前置检查
pub fn require_session(jar: &CookieJar) -> Result<()> {
    if is_valid_session(jar) {
        Ok(())
    } else {
        Err(Error::Unauthorized)
    }
}

/// 用空值和 0 有效期覆盖会话 cookie
pub fn destroy_session(jar: CookieJar) -> CookieJar {
    jar.add(session_cookie(String::new(), Duration::ZERO))
}

fn session_cookie(value: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .max_age(max_age)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .build()
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header};

    use super::*;

    fn gate() -> AuthGate {
        AuthGate::new(Some("admin".into()), Some("s3cret".into()))
    }

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    #[test]
    fn test_authenticate() {
        let gate = gate();
        assert!(gate.authenticate("admin", "s3cret"));
        assert!(!gate.authenticate("admin", "wrong"));
        assert!(!gate.authenticate("Admin", "s3cret"));
    }

    #[test]
    fn test_authenticate_fails_closed() {
        for gate in [
            AuthGate::new(None, None),
            AuthGate::new(Some("admin".into()), None),
            AuthGate::new(None, Some("s3cret".into())),
            AuthGate::new(Some("".into()), Some("".into())),
        ] {
            assert!(!gate.authenticate("admin", "s3cret"));
            assert!(!gate.authenticate("", ""));
        }
    }

    #[test]
    fn test_session_cookie_attributes() {
        let jar = create_session(CookieJar::new());
        let cookie = jar.get(SESSION_COOKIE).expect("应当签发 cookie");

        assert_eq!(cookie.value().len(), SESSION_TOKEN_LEN);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(Duration::hours(24)));
        assert!(is_valid_session(&jar));
    }

    #[test]
    fn test_session_tokens_differ() {
        let a = create_session(CookieJar::new());
        let b = create_session(CookieJar::new());
        assert_ne!(
            a.get(SESSION_COOKIE).unwrap().value(),
            b.get(SESSION_COOKIE).unwrap().value()
        );
    }

    #[test]
    fn test_any_non_empty_cookie_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session_id=anything"));
        assert!(is_valid_session(&CookieJar::from_headers(&headers)));

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session_id="));
        assert!(!is_valid_session(&CookieJar::from_headers(&headers)));

        assert!(!is_valid_session(&CookieJar::new()));
        assert!(matches!(
            require_session(&CookieJar::new()),
            Err(Error::Unauthorized)
        ));
    }

    #[test]
    fn test_destroy_session() {
        let jar = destroy_session(create_session(CookieJar::new()));
        let cookie = jar.get(SESSION_COOKIE).expect("cookie 应被覆盖而非删除");

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert!(!is_valid_session(&jar));
    }

    #[test]
    fn test_login() {
        let gate = gate();

        assert!(matches!(
            gate.login(CookieJar::new(), &credentials("", "s3cret")),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            gate.login(CookieJar::new(), &credentials("admin", "nope")),
            Err(Error::Unauthorized)
        ));

        let jar = gate
            .login(CookieJar::new(), &credentials("admin", "s3cret"))
            .expect("登录失败");
        assert!(is_valid_session(&jar));

        let jar = gate.logout(jar).expect("注销失败");
        assert!(!is_valid_session(&jar));
        assert!(matches!(gate.logout(jar), Err(Error::Unauthorized)));
    }
}
