//! Domain records mirrored from the backend.
//!
//! Every record is identified by an opaque key that is unique within its
//! collection and never changes after creation.

mod category;
mod company;
mod user;

use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use category::Category;
pub use company::{Company, CompanyDraft};
pub use user::{User, UserDraft};

/// A uniquely keyed record held in a normalized collection.
pub trait Entity: Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Identity of the record within its collection.
    type Key: Clone
        + Eq
        + Hash
        + Debug
        + Display
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// Payload accepted by create and update calls.
    type Draft: Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Singular label used in messages (e.g. "user").
    const KIND: &'static str;

    /// Plural label used in messages (e.g. "users").
    const PLURAL: &'static str;

    fn key(&self) -> &Self::Key;
}
