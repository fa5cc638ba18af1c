pub mod avatar;

use avatar::AvatarUpload;

use mingle_core::error::{AppError, AppResult};
use mingle_core::{ProfileId, UserId};
use mingle_db::profile_db;
use mingle_user::auth::Authenticated;

use entrait::entrait_export as entrait;
use time::OffsetDateTime;

/// Default page size for the top profiles listing.
const DEFAULT_PROFILE_LIMIT: i64 = 10;

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
#[cfg_attr(test, derive(PartialEq, Eq))]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

impl From<profile_db::Profile> for Profile {
    fn from(p: profile_db::Profile) -> Self {
        Self {
            id: p.id,
            username: p.username,
            full_name: p.full_name,
            avatar_url: p.avatar_url,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone)]
#[cfg_attr(test, derive(Debug, PartialEq, Eq))]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i32,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<profile_db::Post> for Post {
    fn from(p: profile_db::Post) -> Self {
        Self {
            id: p.id,
            body: p.body,
            created_at: p.created_at,
        }
    }
}

/// A profile plus the relations the caller asked for. Relations that were
/// not requested stay out of the serialized response entirely.
#[derive(serde::Serialize, serde::Deserialize, Clone)]
#[cfg_attr(test, derive(Debug, PartialEq, Eq))]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetail {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<Post>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follows: Option<Vec<Profile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<Vec<Profile>>,
}

pub struct NewProfile {
    pub username: String,
    pub full_name: String,
}

#[derive(serde::Deserialize, Default, Eq, PartialEq)]
#[cfg_attr(test, derive(Debug))]
#[serde(default)]
pub struct TopProfilesQuery {
    pub limit: Option<i64>,
}

#[derive(serde::Deserialize, Default, Eq, PartialEq)]
#[cfg_attr(test, derive(Debug))]
#[serde(default)]
pub struct ProfileInclude {
    pub posts: bool,
    pub follows: bool,
    pub followers: bool,
}

#[entrait(pub FetchCurrentProfile)]
async fn fetch_current_profile(
    deps: &impl profile_db::FindProfileByUserId,
    Authenticated(user_id): Authenticated<UserId>,
) -> AppResult<Profile> {
    deps.find_profile_by_user_id(user_id)
        .await?
        .map(Profile::from)
        .ok_or(AppError::CurrentProfileDoesNotExist)
}

#[entrait(pub FetchTopProfiles)]
async fn fetch_top_profiles(
    deps: &impl profile_db::ListTopProfiles,
    query: TopProfilesQuery,
) -> AppResult<Vec<Profile>> {
    let limit = query
        .limit
        .filter(|limit| *limit > 0)
        .unwrap_or(DEFAULT_PROFILE_LIMIT);

    deps.list_top_profiles(limit)
        .await
        .map(|profiles| profiles.into_iter().map(Into::into).collect())
}

#[entrait(pub FetchProfile)]
async fn fetch_profile(
    deps: &(impl profile_db::FindProfileById
          + profile_db::ListPosts
          + profile_db::ListFollows
          + profile_db::ListFollowers),
    profile_id: ProfileId,
    include: ProfileInclude,
) -> AppResult<ProfileDetail> {
    let profile = deps
        .find_profile_by_id(profile_id)
        .await?
        .ok_or(AppError::ProfileNotFound)?;

    let posts = if include.posts {
        Some(
            deps.list_posts(profile_id)
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
        )
    } else {
        None
    };

    let follows = if include.follows {
        Some(
            deps.list_follows(profile_id)
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
        )
    } else {
        None
    };

    let followers = if include.followers {
        Some(
            deps.list_followers(profile_id)
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
        )
    } else {
        None
    };

    Ok(ProfileDetail {
        id: profile.id,
        username: profile.username,
        full_name: profile.full_name,
        avatar_url: profile.avatar_url,
        posts,
        follows,
        followers,
    })
}

#[entrait(pub CreateProfile)]
async fn create_profile(
    deps: &(impl avatar::StoreAvatar + profile_db::InsertProfile),
    Authenticated(user_id): Authenticated<UserId>,
    new_profile: NewProfile,
    upload: Option<AvatarUpload>,
) -> AppResult<Profile> {
    validate_new_profile(&new_profile)?;

    let avatar_url = deps.store_avatar(upload).await?;

    deps.insert_profile(
        user_id,
        new_profile.username,
        new_profile.full_name,
        avatar_url,
    )
    .await
    .map(Profile::from)
}

#[entrait(pub Follow)]
async fn follow(
    deps: &(impl profile_db::FindProfileByUserId
          + profile_db::InsertFollow
          + profile_db::DeleteFollow),
    Authenticated(user_id): Authenticated<UserId>,
    followed_id: ProfileId,
    value: bool,
) -> AppResult<()> {
    let own_profile = deps
        .find_profile_by_user_id(user_id)
        .await?
        .ok_or(AppError::CurrentProfileDoesNotExist)?;

    if value {
        deps.insert_follow(ProfileId(own_profile.id), followed_id)
            .await
    } else {
        deps.delete_follow(ProfileId(own_profile.id), followed_id)
            .await
    }
}

fn validate_new_profile(new_profile: &NewProfile) -> AppResult<()> {
    let username = &new_profile.username;
    if username.is_empty() {
        return Err(AppError::unprocessable_entity([(
            "username",
            "must not be empty",
        )]));
    }
    if username.len() > 32 {
        return Err(AppError::unprocessable_entity([(
            "username",
            "must be at most 32 characters",
        )]));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::unprocessable_entity([(
            "username",
            "may only contain letters, digits and underscores",
        )]));
    }
    if new_profile.full_name.trim().is_empty() {
        return Err(AppError::unprocessable_entity([(
            "fullName",
            "must not be empty",
        )]));
    }
    Ok(())
}
