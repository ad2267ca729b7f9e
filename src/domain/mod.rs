pub mod notice;
pub mod pagination;
pub mod stats;
pub mod user;

pub use notice::*;
pub use pagination::*;
pub use stats::*;
pub use user::*;

use serde::{Deserialize, Deserializer};

/// Deserializes a field that distinguishes "absent" (`None`, via `#[serde(default)]`)
/// from "explicitly null" (`Some(None)`).
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
