use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::utils::error::Error;

/// Runtime a version targets, as the catalog names it in `v2/tag/loader`.
///
/// Tokens are lower-case and parsed case-insensitively. The set must match the
/// catalog's own list; `mcmods check-enums` reports any drift.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(try_from = "String", into = "&'static str")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum LoaderKind {
    Babric,
    BtaBabric,
    Bukkit,
    Bungeecord,
    Canvas,
    Datapack,
    Fabric,
    Folia,
    Forge,
    Iris,
    JavaAgent,
    LegacyFabric,
    Liteloader,
    Minecraft,
    Modloader,
    Neoforge,
    Nilloader,
    Optifine,
    Ornithe,
    Paper,
    Purpur,
    Quilt,
    Rift,
    Spigot,
    Sponge,
    Vanilla,
    Velocity,
    Waterfall,
}

impl LoaderKind {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

impl TryFrom<String> for LoaderKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse().map_err(|_| Error::InvalidEnum {
            kind: "loader",
            value,
        })
    }
}

/// Relationship between a version and a project it references.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(try_from = "String", into = "&'static str")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DependencyKind {
    Required,
    Optional,
    Incompatible,
    Embedded,
}

impl TryFrom<String> for DependencyKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse().map_err(|_| Error::InvalidEnum {
            kind: "dependency type",
            value,
        })
    }
}
