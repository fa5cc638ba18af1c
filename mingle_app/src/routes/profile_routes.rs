use mingle_core::error::{AppError, AppResult};
use mingle_core::ProfileId;
use mingle_profile::avatar::AvatarUpload;
use mingle_profile::{NewProfile, ProfileInclude, TopProfilesQuery};
use mingle_user::auth::Token;

use axum::extract::{Extension, Multipart, Path, Query};
use axum::routing::{get, post};
use axum::Json;

#[derive(serde::Serialize, serde::Deserialize, Debug)]
struct ProfileBody<T> {
    profile: T,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
struct ProfilesBody {
    profiles: Vec<mingle_profile::Profile>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
struct MessageBody {
    message: String,
}

pub struct ProfileRoutes<D>(std::marker::PhantomData<D>);

impl<D> ProfileRoutes<D>
where
    D: mingle_profile::FetchCurrentProfile
        + mingle_profile::FetchTopProfiles
        + mingle_profile::FetchProfile
        + mingle_profile::CreateProfile
        + mingle_profile::Follow
        + mingle_user::auth::Authenticate
        + Sized
        + Clone
        + Send
        + Sync
        + 'static,
{
    pub fn router() -> axum::Router {
        axum::Router::new()
            .route("/profile", get(Self::current_profile))
            .route(
                "/profiles",
                get(Self::top_profiles).post(Self::create_profile),
            )
            .route("/profiles/:profile_id", get(Self::profile))
            .route(
                "/profiles/:profile_id/follow",
                post(Self::follow).delete(Self::unfollow),
            )
    }

    async fn current_profile(
        Extension(deps): Extension<D>,
        token: Token,
    ) -> AppResult<Json<ProfileBody<mingle_profile::Profile>>> {
        let user = deps.authenticate(token)?;
        Ok(Json(ProfileBody {
            profile: deps.fetch_current_profile(user).await?,
        }))
    }

    async fn top_profiles(
        Extension(deps): Extension<D>,
        Query(query): Query<TopProfilesQuery>,
    ) -> AppResult<Json<ProfilesBody>> {
        Ok(Json(ProfilesBody {
            profiles: deps.fetch_top_profiles(query).await?,
        }))
    }

    async fn profile(
        Extension(deps): Extension<D>,
        Path(profile_id): Path<i32>,
        Query(include): Query<ProfileInclude>,
    ) -> AppResult<Json<ProfileBody<mingle_profile::ProfileDetail>>> {
        Ok(Json(ProfileBody {
            profile: deps.fetch_profile(ProfileId(profile_id), include).await?,
        }))
    }

    async fn create_profile(
        Extension(deps): Extension<D>,
        token: Token,
        multipart: Multipart,
    ) -> AppResult<Json<MessageBody>> {
        let user = deps.authenticate(token)?;
        let (new_profile, upload) = read_profile_form(multipart).await?;

        deps.create_profile(user, new_profile, upload).await?;

        Ok(Json(MessageBody {
            message: "Profile created successfully".to_string(),
        }))
    }

    async fn follow(
        Extension(deps): Extension<D>,
        token: Token,
        Path(profile_id): Path<i32>,
    ) -> AppResult<Json<MessageBody>> {
        let user = deps.authenticate(token)?;
        deps.follow(user, ProfileId(profile_id), true).await?;

        Ok(Json(MessageBody {
            message: "Followed profile successfully".to_string(),
        }))
    }

    async fn unfollow(
        Extension(deps): Extension<D>,
        token: Token,
        Path(profile_id): Path<i32>,
    ) -> AppResult<Json<MessageBody>> {
        let user = deps.authenticate(token)?;
        deps.follow(user, ProfileId(profile_id), false).await?;

        Ok(Json(MessageBody {
            message: "Unfollowed profile successfully".to_string(),
        }))
    }
}

/// Pulls the profile fields and the optional avatar file out of the
/// `multipart/form-data` body.
async fn read_profile_form(
    mut multipart: Multipart,
) -> AppResult<(NewProfile, Option<AvatarUpload>)> {
    let mut username = None;
    let mut full_name = None;
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| anyhow::anyhow!("malformed multipart request: {e}"))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("username") => {
                username = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| anyhow::anyhow!("malformed username field: {e}"))?,
                );
            }
            Some("fullName") => {
                full_name = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| anyhow::anyhow!("malformed fullName field: {e}"))?,
                );
            }
            Some("avatar") => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| anyhow::anyhow!("malformed avatar field: {e}"))?;
                upload = Some(AvatarUpload { file_name, bytes });
            }
            _ => {}
        }
    }

    let new_profile = NewProfile {
        username: username
            .ok_or_else(|| AppError::unprocessable_entity([("username", "is required")]))?,
        full_name: full_name
            .ok_or_else(|| AppError::unprocessable_entity([("fullName", "is required")]))?,
    };

    Ok((new_profile, upload))
}
