use crate::config::Config;
use mingle_db::{Db, GetDb};

use std::sync::Arc;
use time::OffsetDateTime;

#[derive(Clone)]
pub struct App {
    pub config: Arc<Config>,
    pub db: Db,
}

impl GetDb for App {
    fn get_db(&self) -> &Db {
        &self.db
    }
}

impl mingle_core::System for App {
    fn get_current_time(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

impl mingle_core::GetConfig for App {
    fn get_jwt_signing_key(&self) -> &hmac::Hmac<sha2::Sha384> {
        &self.config.jwt_signing_key.0
    }

    fn get_avatar_dir(&self) -> &std::path::Path {
        &self.config.avatar_dir
    }
}
