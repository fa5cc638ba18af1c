use mingle_core::error::{AppError, AppResult};
use mingle_core::{GetConfig, System, UserId};

use axum::http::HeaderValue;
use axum::TypedHeader;
use entrait::entrait_export as entrait;
use headers::authorization::Credentials;
use headers::Authorization;
use jwt::SignWithKey;
use jwt::VerifyWithKey;
use uuid::Uuid;

const DEFAULT_SESSION_LENGTH: time::Duration = time::Duration::weeks(2);

#[derive(serde::Serialize, serde::Deserialize)]
struct AuthUserClaims {
    user_id: Uuid,
    /// Standard JWT `exp` claim.
    exp: i64,
}

#[entrait(pub SignUserId)]
fn sign_user_id(deps: &(impl System + GetConfig), user_id: UserId) -> String {
    AuthUserClaims {
        user_id: user_id.0,
        exp: (deps.get_current_time() + DEFAULT_SESSION_LENGTH).unix_timestamp(),
    }
    .sign_with_key(deps.get_jwt_signing_key())
    .expect("HMAC signing should be infallible")
}

/// Marker/Wrapper type for anything authenticated
#[derive(Clone, Debug)]
pub struct Authenticated<T>(pub T);

#[entrait(pub Authenticate)]
fn authenticate(deps: &(impl System + GetConfig), token: Token) -> AppResult<Authenticated<UserId>> {
    let token = token.token();

    let jwt = jwt::Token::<jwt::Header, AuthUserClaims, _>::parse_unverified(token)
        .map_err(|_| AppError::Unauthorized)?;

    let hmac = deps.get_jwt_signing_key();

    let jwt = jwt
        .verify_with_key(hmac)
        .map_err(|_| AppError::Unauthorized)?;
    let (_header, claims) = jwt.into();

    if claims.exp < deps.get_current_time().unix_timestamp() {
        return Err(AppError::Unauthorized);
    }

    Ok(Authenticated(UserId(claims.user_id)))
}

///
/// Data for `Token` authorization scheme.
///
#[derive(Debug)]
pub struct Token(String);

impl Token {
    pub fn from_token(token: &str) -> Self {
        Self(format!("Token {token}"))
    }

    pub fn token(&self) -> &str {
        &self.0.as_str()["Token ".len()..]
    }
}

impl Credentials for Token {
    const SCHEME: &'static str = "Token";

    fn decode(value: &HeaderValue) -> Option<Self> {
        let auth_header = value.to_str().ok()?;

        Some(Token(auth_header.to_string()))
    }

    fn encode(&self) -> HeaderValue {
        HeaderValue::from_str(&self.0).unwrap()
    }
}

#[async_trait::async_trait]
impl<B: Send> axum::extract::FromRequest<B> for Token {
    type Rejection = AppError;

    async fn from_request(
        req: &mut axum::extract::RequestParts<B>,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(token)) =
            TypedHeader::<Authorization<Token>>::from_request(req)
                .await
                .map_err(|_| AppError::Unauthorized)?;

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mingle_core::test::TestEnv;

    use assert_matches::*;

    #[test]
    fn should_sign_and_authenticate_token() {
        let user_id =
            UserId(uuid::Uuid::parse_str("20a626ba-c7d3-44c7-981a-e880f81c126f").unwrap());
        let env = TestEnv::default();
        let token = sign_user_id(&env, user_id.clone());

        let Authenticated(result_user_id) =
            authenticate(&env, Token::from_token(&token)).unwrap();

        assert_eq!(user_id, result_user_id);
    }

    #[test]
    fn should_reject_expired_token() {
        let user_id =
            UserId(uuid::Uuid::parse_str("20a626ba-c7d3-44c7-981a-e880f81c126f").unwrap());
        let signing_env = TestEnv::default();
        let token = sign_user_id(&signing_env, user_id);

        let expired_env = TestEnv {
            current_time: signing_env.current_time + DEFAULT_SESSION_LENGTH + time::Duration::days(1),
            ..TestEnv::default()
        };

        assert_matches!(
            authenticate(&expired_env, Token::from_token(&token)),
            Err(AppError::Unauthorized)
        );
    }

    #[test]
    fn should_reject_garbage_token() {
        let env = TestEnv::default();

        assert_matches!(
            authenticate(&env, Token::from_token("not-a-jwt")),
            Err(AppError::Unauthorized)
        );
    }
}
