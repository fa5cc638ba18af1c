use mingle_core::error::AppResult;
use mingle_user::auth::Token;

use axum::extract::Extension;
use axum::routing::{get, post};
use axum::Json;

#[derive(serde::Serialize, serde::Deserialize, Debug)]
struct UserBody<T> {
    user: T,
}

pub struct UserRoutes<D>(std::marker::PhantomData<D>);

impl<D> UserRoutes<D>
where
    D: mingle_user::CreateUser
        + mingle_user::Login
        + mingle_user::FetchCurrentUser
        + mingle_user::auth::Authenticate
        + Sized
        + Clone
        + Send
        + Sync
        + 'static,
{
    pub fn router() -> axum::Router {
        axum::Router::new()
            .route("/users", post(Self::create))
            .route("/users/login", post(Self::login))
            .route("/user", get(Self::current_user))
    }

    async fn create(
        Extension(deps): Extension<D>,
        Json(body): Json<UserBody<mingle_user::NewUser>>,
    ) -> AppResult<Json<UserBody<mingle_user::SignedUser>>> {
        Ok(Json(UserBody {
            user: deps.create_user(body.user).await?,
        }))
    }

    async fn login(
        Extension(deps): Extension<D>,
        Json(body): Json<UserBody<mingle_user::LoginUser>>,
    ) -> AppResult<Json<UserBody<mingle_user::SignedUser>>> {
        Ok(Json(UserBody {
            user: deps.login(body.user).await?,
        }))
    }

    async fn current_user(
        Extension(deps): Extension<D>,
        token: Token,
    ) -> AppResult<Json<UserBody<mingle_user::SignedUser>>> {
        let user_id = deps.authenticate(token)?;
        Ok(Json(UserBody {
            user: deps.fetch_current_user(user_id).await?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;
    use mingle_core::UserId;
    use mingle_user::auth::Authenticated;
    use mingle_user::*;

    use axum::http::{Request, StatusCode};
    use unimock::*;

    fn test_router(deps: Unimock) -> axum::Router {
        UserRoutes::<Unimock>::router().layer(Extension(deps))
    }

    fn test_uuid() -> uuid::Uuid {
        uuid::Uuid::parse_str("20a626ba-c7d3-44c7-981a-e880f81c126f").unwrap()
    }

    fn test_signed_user() -> SignedUser {
        SignedUser {
            email: "e".to_string(),
            token: "e".to_string(),
        }
    }

    #[tokio::test]
    async fn unit_test_create_user() {
        let deps = mock(Some(
            create_user::Fn
                .next_call(matching!(_))
                .answers(|_| Ok(test_signed_user()))
                .once()
                .in_order(),
        ));

        let (status, _) = request_json::<UserBody<SignedUser>>(
            test_router(deps.clone()),
            Request::post("/users").with_json_body(UserBody {
                user: NewUser {
                    email: "email".to_string(),
                    password: "password".to_string(),
                },
            }),
        )
        .await
        .unwrap();

        assert_eq!(StatusCode::OK, status);
    }

    #[tokio::test]
    async fn unit_test_login() {
        let deps = mock(Some(
            login::Fn
                .next_call(matching!(_))
                .answers(|_| Ok(test_signed_user()))
                .once()
                .in_order(),
        ));

        let (status, user_body) = request_json::<UserBody<SignedUser>>(
            test_router(deps.clone()),
            Request::post("/users/login").with_json_body(UserBody {
                user: LoginUser {
                    email: "email".to_string(),
                    password: "password".to_string(),
                },
            }),
        )
        .await
        .unwrap();

        assert_eq!(StatusCode::OK, status);
        assert_eq!("e", user_body.user.email);
    }

    #[tokio::test]
    async fn protected_endpoint_with_no_token_should_give_401() {
        let deps = mock(None);
        let (status, _) = request(
            test_router(deps.clone()),
            Request::get("/user").empty_body(),
        )
        .await;
        assert_eq!(StatusCode::UNAUTHORIZED, status);
    }

    #[tokio::test]
    async fn current_user_should_work() {
        let deps = mock([
            auth::authenticate::Fn
                .next_call(matching! {
                    (token) if token.token() == "123"
                })
                .answers(|_| Ok(Authenticated(UserId(test_uuid()))))
                .once()
                .in_order(),
            fetch_current_user::Fn
                .next_call(matching! {
                    (Authenticated(UserId(id))) if id == &test_uuid()
                })
                .answers(|_| Ok(test_signed_user()))
                .once()
                .in_order(),
        ]);

        let (status, _) = request_json::<UserBody<SignedUser>>(
            test_router(deps.clone()),
            Request::get("/user")
                .header("Authorization", "Token 123")
                .empty_body(),
        )
        .await
        .unwrap();

        assert_eq!(StatusCode::OK, status);
    }
}
