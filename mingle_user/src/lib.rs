pub mod auth;
pub mod password;

use auth::Authenticated;

use mingle_core::error::{AppError, AppResult};
use mingle_core::UserId;
use mingle_db::user_db;

use entrait::entrait_export as entrait;

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct SignedUser {
    pub email: String,
    pub token: String,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
}

#[entrait(pub CreateUser)]
async fn create_user(
    deps: &(impl password::HashPassword + user_db::InsertUser + auth::SignUserId),
    new_user: NewUser,
) -> AppResult<SignedUser> {
    let password_hash = deps.hash_password(new_user.password).await?;

    let db_user = deps.insert_user(new_user.email, password_hash).await?;

    Ok(sign_db_user(deps, db_user))
}

#[entrait(pub Login)]
async fn login(
    deps: &(impl user_db::FindUserByEmail + password::VerifyPassword + auth::SignUserId),
    login_user: LoginUser,
) -> AppResult<SignedUser> {
    let (db_user, password_hash) = deps
        .find_user_by_email(login_user.email)
        .await?
        .ok_or(AppError::EmailDoesNotExist)?;

    deps.verify_password(login_user.password, password_hash)
        .await?;

    Ok(sign_db_user(deps, db_user))
}

#[entrait(pub FetchCurrentUser)]
async fn fetch_current_user(
    deps: &(impl user_db::FindUserById + auth::SignUserId),
    Authenticated(user_id): Authenticated<UserId>,
) -> AppResult<SignedUser> {
    let (db_user, _) = deps
        .find_user_by_id(user_id)
        .await?
        .ok_or(AppError::CurrentUserDoesNotExist)?;

    Ok(sign_db_user(deps, db_user))
}

fn sign_db_user(deps: &impl auth::SignUserId, db_user: user_db::User) -> SignedUser {
    SignedUser {
        token: deps.sign_user_id(UserId(db_user.id)),
        email: db_user.email,
    }
}
