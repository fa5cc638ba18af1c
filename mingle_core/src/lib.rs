use entrait::entrait_export as entrait;

pub mod error;

/// Id of an account row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserId(pub uuid::Uuid);

/// Id of a profile row. Always an integer; path parameters that don't parse
/// as one are rejected before reaching the database.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProfileId(pub i32);

#[derive(Clone)]
pub struct PasswordHash(pub String);

///
/// Mockable system abstraction
///
#[entrait]
pub trait System {
    fn get_current_time(&self) -> time::OffsetDateTime;
}

///
/// Mockable config accessor
///
#[entrait]
pub trait GetConfig {
    fn get_jwt_signing_key(&self) -> &hmac::Hmac<sha2::Sha384>;
    fn get_avatar_dir(&self) -> &std::path::Path;
}
