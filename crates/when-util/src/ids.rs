//! Opaque identifiers supplied by the content-addressing and identity systems
//!
//! None of these are parsed or validated here; they are compared as strings.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

opaque_key!(
    /// Course identifier, e.g. `course-v1:TestX+Test+2025`
    CourseKey
);

opaque_key!(
    /// Content block identifier, e.g. `block-v1:TestX+Test+2025+type@sequential+block@test`
    UsageKey
);

opaque_key!(
    /// Learner (or staff actor) identifier
    UserId
);
