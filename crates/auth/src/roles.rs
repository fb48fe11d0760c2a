use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role name carried on a user record (e.g. `"manager"`, `"cashier"`, or a
/// subscriber-defined key like `"warehouse-lead"`).
///
/// Opaque at this layer: built-in names map to grants through
/// [`crate::matrix`], custom keys through the tenant's stored role records.
/// A name neither knows is simply a role that grants nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
