use crate::DbResultExt;
use crate::GetDb;
use mingle_core::error::{AppError, AppResult};
use mingle_core::{ProfileId, UserId};

use entrait::entrait_export as entrait;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, Eq, PartialEq, sqlx::FromRow)]
pub struct Profile {
    pub id: i32,
    pub user_id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, sqlx::FromRow)]
pub struct Post {
    pub id: i32,
    pub body: String,
    pub created_at: OffsetDateTime,
}

#[entrait(pub InsertProfile)]
async fn insert_profile(
    deps: &impl GetDb,
    UserId(user_id): UserId,
    username: String,
    full_name: String,
    avatar_url: Option<String>,
) -> AppResult<Profile> {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO app.profile (user_id, username, full_name, avatar_url) \
         VALUES ($1, $2, $3, $4) \
         RETURNING profile_id",
    )
    .bind(user_id)
    .bind(&username)
    .bind(&full_name)
    .bind(&avatar_url)
    .fetch_one(&deps.get_db().pg_pool)
    .await
    .on_constraint("profile_username_key", |_| AppError::UsernameTaken)
    .on_constraint("profile_user_id_key", |_| AppError::ProfileAlreadyExists)?;

    Ok(Profile {
        id,
        user_id,
        username,
        full_name,
        avatar_url,
    })
}

#[entrait(pub FindProfileById)]
async fn find_profile_by_id(
    deps: &impl GetDb,
    ProfileId(profile_id): ProfileId,
) -> AppResult<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(
        "SELECT profile_id AS id, user_id, username, full_name, avatar_url \
         FROM app.profile \
         WHERE profile_id = $1",
    )
    .bind(profile_id)
    .fetch_optional(&deps.get_db().pg_pool)
    .await?;

    Ok(profile)
}

#[entrait(pub FindProfileByUserId)]
async fn find_profile_by_user_id(
    deps: &impl GetDb,
    UserId(user_id): UserId,
) -> AppResult<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(
        "SELECT profile_id AS id, user_id, username, full_name, avatar_url \
         FROM app.profile \
         WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(&deps.get_db().pg_pool)
    .await?;

    Ok(profile)
}

/// Profiles ordered by follower count, most followed first.
/// Ties are broken by ascending id so that pages are stable.
#[entrait(pub ListTopProfiles)]
async fn list_top_profiles(deps: &impl GetDb, limit: i64) -> AppResult<Vec<Profile>> {
    let profiles = sqlx::query_as::<_, Profile>(
        "SELECT p.profile_id AS id, p.user_id, p.username, p.full_name, p.avatar_url \
         FROM app.profile p \
         LEFT JOIN app.follow f ON f.followed_profile_id = p.profile_id \
         GROUP BY p.profile_id \
         ORDER BY COUNT(f.following_profile_id) DESC, p.profile_id ASC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(&deps.get_db().pg_pool)
    .await?;

    Ok(profiles)
}

#[entrait(pub ListPosts)]
async fn list_posts(deps: &impl GetDb, ProfileId(profile_id): ProfileId) -> AppResult<Vec<Post>> {
    let posts = sqlx::query_as::<_, Post>(
        "SELECT post_id AS id, body, created_at \
         FROM app.post \
         WHERE profile_id = $1 \
         ORDER BY created_at DESC, post_id DESC",
    )
    .bind(profile_id)
    .fetch_all(&deps.get_db().pg_pool)
    .await?;

    Ok(posts)
}

#[entrait(pub ListFollows)]
async fn list_follows(
    deps: &impl GetDb,
    ProfileId(profile_id): ProfileId,
) -> AppResult<Vec<Profile>> {
    let profiles = sqlx::query_as::<_, Profile>(
        "SELECT p.profile_id AS id, p.user_id, p.username, p.full_name, p.avatar_url \
         FROM app.profile p \
         JOIN app.follow f ON f.followed_profile_id = p.profile_id \
         WHERE f.following_profile_id = $1 \
         ORDER BY p.profile_id",
    )
    .bind(profile_id)
    .fetch_all(&deps.get_db().pg_pool)
    .await?;

    Ok(profiles)
}

#[entrait(pub ListFollowers)]
async fn list_followers(
    deps: &impl GetDb,
    ProfileId(profile_id): ProfileId,
) -> AppResult<Vec<Profile>> {
    let profiles = sqlx::query_as::<_, Profile>(
        "SELECT p.profile_id AS id, p.user_id, p.username, p.full_name, p.avatar_url \
         FROM app.profile p \
         JOIN app.follow f ON f.following_profile_id = p.profile_id \
         WHERE f.followed_profile_id = $1 \
         ORDER BY p.profile_id",
    )
    .bind(profile_id)
    .fetch_all(&deps.get_db().pg_pool)
    .await?;

    Ok(profiles)
}

/// Appends a follow edge. Following a profile twice is a no-op.
#[entrait(pub InsertFollow)]
async fn insert_follow(
    deps: &impl GetDb,
    ProfileId(following_id): ProfileId,
    ProfileId(followed_id): ProfileId,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO app.follow (following_profile_id, followed_profile_id) \
         VALUES ($1, $2) \
         ON CONFLICT DO NOTHING",
    )
    .bind(following_id)
    .bind(followed_id)
    .execute(&deps.get_db().pg_pool)
    .await
    .on_constraint("follow_followed_profile_id_fkey", |_| {
        AppError::ProfileNotFound
    })
    .on_constraint("profile_cannot_follow_self", |_| AppError::Forbidden)?;

    Ok(())
}

#[entrait(pub DeleteFollow)]
async fn delete_follow(
    deps: &impl GetDb,
    ProfileId(following_id): ProfileId,
    ProfileId(followed_id): ProfileId,
) -> AppResult<()> {
    let (target_exists, _deleted): (bool, bool) = sqlx::query_as(
        "WITH target AS ( \
             SELECT profile_id FROM app.profile WHERE profile_id = $2 \
         ), deleted AS ( \
             DELETE FROM app.follow \
             WHERE following_profile_id = $1 \
             AND followed_profile_id = (SELECT profile_id FROM target) \
             RETURNING 1 \
         ) \
         SELECT \
             EXISTS(SELECT 1 FROM target), \
             EXISTS(SELECT 1 FROM deleted)",
    )
    .bind(following_id)
    .bind(followed_id)
    .fetch_one(&deps.get_db().pg_pool)
    .await?;

    if !target_exists {
        Err(AppError::ProfileNotFound)
    } else {
        // Unfollowing someone who was never followed is not an error
        Ok(())
    }
}
