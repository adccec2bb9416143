//! User entity and its validated components.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by the user component constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyNickName,
    NickNameTooShort { min: usize },
    AgeOutOfRange { min: i32, max: i32 },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyNickName => write!(f, "nickname must not be empty"),
            Self::NickNameTooShort { min } => {
                write!(f, "nickname must be at least {min} characters")
            }
            Self::AgeOutOfRange { min, max } => {
                write!(f, "age must be between {min} and {max}")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID, generated server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        let parsed = Uuid::parse_str(raw).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed))
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Whether this identifier is the all-zero UUID.
    ///
    /// A nil identifier coming back from a persistence adapter marks a
    /// detectable persistence failure.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Minimum nickname length in characters.
pub const NICK_NAME_MIN: usize = 2;
/// Inclusive lower bound for the accepted age range.
pub const AGE_MIN: i32 = 19;
/// Inclusive upper bound for the accepted age range.
pub const AGE_MAX: i32 = 99;

/// Nickname shown to other users, unique across all users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NickName(String);

impl NickName {
    /// Validate and construct a [`NickName`] from owned input.
    pub fn new(nick_name: impl Into<String>) -> Result<Self, UserValidationError> {
        let nick_name = nick_name.into();
        if nick_name.trim().is_empty() {
            return Err(UserValidationError::EmptyNickName);
        }
        if nick_name.chars().count() < NICK_NAME_MIN {
            return Err(UserValidationError::NickNameTooShort { min: NICK_NAME_MIN });
        }
        Ok(Self(nick_name))
    }
}

impl AsRef<str> for NickName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for NickName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<NickName> for String {
    fn from(value: NickName) -> Self {
        value.0
    }
}

impl TryFrom<String> for NickName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Age in whole years, accepted between [`AGE_MIN`] and [`AGE_MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Age(i32);

impl Age {
    /// Validate and construct an [`Age`].
    pub fn new(age: i32) -> Result<Self, UserValidationError> {
        if !(AGE_MIN..=AGE_MAX).contains(&age) {
            return Err(UserValidationError::AgeOutOfRange {
                min: AGE_MIN,
                max: AGE_MAX,
            });
        }
        Ok(Self(age))
    }

    /// The age value in whole years.
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl From<Age> for i32 {
    fn from(value: Age) -> Self {
        value.0
    }
}

impl TryFrom<i32> for Age {
    type Error = UserValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted application user.
///
/// ## Invariants
/// - `id` is a valid, server-generated UUID and never changes.
/// - `nick_name` satisfies the [`NickName`] rules and is unique across users
///   (enforced by the persistence adapter).
/// - `age` lies within the accepted range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    nick_name: NickName,
    age: Age,
}

impl User {
    /// Build a new [`User`] from validated components.
    pub fn new(id: UserId, nick_name: NickName, age: Age) -> Self {
        Self { id, nick_name, age }
    }

    /// Fallible constructor enforcing all component invariants.
    pub fn try_from_parts(
        id: impl AsRef<str>,
        nick_name: impl Into<String>,
        age: i32,
    ) -> Result<Self, UserValidationError> {
        Ok(Self::new(
            UserId::new(id)?,
            NickName::new(nick_name)?,
            Age::new(age)?,
        ))
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Nickname shown to other users.
    pub fn nick_name(&self) -> &NickName {
        &self.nick_name
    }

    /// Age in whole years.
    pub fn age(&self) -> Age {
        self.age
    }
}

/// Read projection of a persisted user returned on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    /// Stable user identifier.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: UserId,
    /// Nickname shown to other users.
    #[schema(example = "Alice")]
    pub nick_name: String,
    /// Age in whole years.
    #[schema(example = 30)]
    pub age: i32,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id(),
            nick_name: user.nick_name().as_ref().to_owned(),
            age: user.age().value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::EmptyNickName)]
    #[case("   ", UserValidationError::EmptyNickName)]
    #[case("A", UserValidationError::NickNameTooShort { min: NICK_NAME_MIN })]
    fn nick_name_rejects_invalid_input(
        #[case] input: &str,
        #[case] expected: UserValidationError,
    ) {
        let err = NickName::new(input).expect_err("invalid nickname must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("Al")]
    #[case("Ada Lovelace")]
    fn nick_name_accepts_valid_input(#[case] input: &str) {
        let nick = NickName::new(input).expect("valid nickname");
        assert_eq!(nick.as_ref(), input);
    }

    #[rstest]
    #[case(18)]
    #[case(100)]
    #[case(0)]
    #[case(-1)]
    fn age_rejects_values_outside_accepted_range(#[case] value: i32) {
        let err = Age::new(value).expect_err("out-of-range age must fail");
        assert_eq!(
            err,
            UserValidationError::AgeOutOfRange {
                min: AGE_MIN,
                max: AGE_MAX
            }
        );
    }

    #[rstest]
    #[case(19)]
    #[case(30)]
    #[case(99)]
    fn age_accepts_boundary_and_interior_values(#[case] value: i32) {
        assert_eq!(Age::new(value).expect("valid age").value(), value);
    }

    #[test]
    fn user_id_parses_and_rejects() {
        assert!(UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").is_ok());
        assert_eq!(
            UserId::new("").expect_err("empty id"),
            UserValidationError::EmptyId
        );
        assert_eq!(
            UserId::new("not-a-uuid").expect_err("invalid id"),
            UserValidationError::InvalidId
        );
    }

    #[test]
    fn random_user_id_is_not_nil() {
        assert!(!UserId::random().is_nil());
    }

    #[test]
    fn user_view_projects_all_fields() {
        let user = User::try_from_parts("3fa85f64-5717-4562-b3fc-2c963f66afa6", "Alice", 30)
            .expect("valid user");
        let view = UserView::from(&user);
        assert_eq!(view.id, *user.id());
        assert_eq!(view.nick_name, "Alice");
        assert_eq!(view.age, 30);
    }

    #[test]
    fn user_view_serialises_camel_case() {
        let user = User::try_from_parts("3fa85f64-5717-4562-b3fc-2c963f66afa6", "Alice", 30)
            .expect("valid user");
        let json = serde_json::to_value(UserView::from(&user)).expect("serialise");
        assert_eq!(json.get("nickName").and_then(|v| v.as_str()), Some("Alice"));
        assert!(json.get("nick_name").is_none());
    }
}
