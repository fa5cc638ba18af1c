use crate::DbResultExt;
use crate::GetDb;
use mingle_core::error::{AppError, AppResult};
use mingle_core::{PasswordHash, UserId};

use entrait::entrait_export as entrait;
use uuid::Uuid;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    password_hash: String,
}

impl UserRow {
    fn into_user_and_hash(self) -> (User, PasswordHash) {
        (
            User {
                id: self.user_id,
                email: self.email,
            },
            PasswordHash(self.password_hash),
        )
    }
}

#[entrait(pub InsertUser)]
pub(crate) async fn insert_user(
    deps: &impl GetDb,
    email: String,
    password_hash: PasswordHash,
) -> AppResult<User> {
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO app.user (email, password_hash) VALUES ($1, $2) RETURNING user_id",
    )
    .bind(&email)
    .bind(&password_hash.0)
    .fetch_one(&deps.get_db().pg_pool)
    .await
    .on_constraint("user_email_key", |_| AppError::EmailTaken)?;

    Ok(User { id, email })
}

#[entrait(pub FindUserById)]
async fn find_user_by_id(
    deps: &impl GetDb,
    UserId(user_id): UserId,
) -> AppResult<Option<(User, PasswordHash)>> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT user_id, email, password_hash FROM app.user WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(&deps.get_db().pg_pool)
    .await?;

    Ok(row.map(UserRow::into_user_and_hash))
}

#[entrait(pub FindUserByEmail)]
async fn find_user_by_email(
    deps: &impl GetDb,
    email: String,
) -> AppResult<Option<(User, PasswordHash)>> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT user_id, email, password_hash FROM app.user WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(&deps.get_db().pg_pool)
    .await?;

    Ok(row.map(UserRow::into_user_and_hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_test_db;

    use assert_matches::*;

    #[tokio::test]
    async fn should_insert_then_fetch_user() {
        let db = create_test_db().await;
        let created_user = insert_user(
            &db,
            "name@email.com".to_string(),
            PasswordHash("hash".to_string()),
        )
        .await
        .unwrap();

        assert_eq!("name@email.com", created_user.email);

        let (fetched_user, _) = db
            .find_user_by_id(UserId(created_user.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created_user, fetched_user);

        let (fetched_user, fetched_hash) = db
            .find_user_by_email("name@email.com".to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created_user, fetched_user);
        assert_eq!("hash", fetched_hash.0);
    }

    #[tokio::test]
    async fn should_fail_to_create_two_users_with_the_same_email() {
        let db = create_test_db().await;
        insert_user(
            &db,
            "name@email.com".to_string(),
            PasswordHash("hash".to_string()),
        )
        .await
        .unwrap();

        let error = insert_user(
            &db,
            "name@email.com".to_string(),
            PasswordHash("otherhash".to_string()),
        )
        .await
        .expect_err("should error");

        assert_matches!(error, AppError::EmailTaken);
    }
}
