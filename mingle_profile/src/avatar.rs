use mingle_core::error::AppResult;
use mingle_core::GetConfig;

use anyhow::Context;
use bytes::Bytes;
use entrait::entrait_export as entrait;
use uuid::Uuid;

/// An avatar image received as part of a multipart upload.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug))]
pub struct AvatarUpload {
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

/// Stores an uploaded avatar and returns the URL it will be served under.
///
/// This runs for every profile creation. With no upload there is nothing to
/// store and the profile gets no avatar URL, but a failure to store an upload
/// that is present aborts the creation.
#[entrait(pub StoreAvatar)]
async fn store_avatar(
    deps: &impl GetConfig,
    upload: Option<AvatarUpload>,
) -> AppResult<Option<String>> {
    let upload = match upload {
        Some(upload) => upload,
        None => return Ok(None),
    };

    let extension = upload
        .file_name
        .as_deref()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, extension)| extension)
        .unwrap_or("bin");
    let file_name = format!("{}.{}", Uuid::new_v4(), extension);

    let dir = deps.get_avatar_dir();
    tokio::fs::create_dir_all(dir)
        .await
        .context("failed to create avatar directory")?;

    let path = dir.join(&file_name);
    tokio::fs::write(&path, &upload.bytes)
        .await
        .with_context(|| format!("failed to store avatar at {}", path.display()))?;

    Ok(Some(format!("/avatars/{file_name}")))
}
