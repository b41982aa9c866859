use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every material the terrain pipeline can place.
///
/// The discriminant is the on-heap byte stored by chunk buffers, so the order is part of
/// the determinism contract: never reorder, only append.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Material {
    #[default]
    Air = 0,
    Stone = 1,
    Deepslate = 2,
    Bedrock = 3,
    Water = 4,
    Lava = 5,
    Dirt = 6,
    Grass = 7,
    Sand = 8,
    Gravel = 9,
    Snow = 10,
    CopperOre = 11,
    RawCopperBlock = 12,
    Granite = 13,
    IronOre = 14,
    RawIronBlock = 15,
    Tuff = 16,
}

impl Material {
    pub const ALL: [Material; 17] = [
        Material::Air,
        Material::Stone,
        Material::Deepslate,
        Material::Bedrock,
        Material::Water,
        Material::Lava,
        Material::Dirt,
        Material::Grass,
        Material::Sand,
        Material::Gravel,
        Material::Snow,
        Material::CopperOre,
        Material::RawCopperBlock,
        Material::Granite,
        Material::IronOre,
        Material::RawIronBlock,
        Material::Tuff,
    ];

    #[inline]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn from_byte(byte: u8) -> Option<Material> {
        Self::ALL.get(byte as usize).copied()
    }

    #[inline]
    pub const fn is_air(self) -> bool {
        matches!(self, Material::Air)
    }

    #[inline]
    pub const fn is_fluid(self) -> bool {
        matches!(self, Material::Water | Material::Lava)
    }

    /// Solid for movement purposes: neither air nor a fluid.
    #[inline]
    pub const fn blocks_motion(self) -> bool {
        !self.is_air() && !self.is_fluid()
    }

    /// Rock the surface pass is allowed to overwrite with biome dressing.
    #[inline]
    pub const fn is_base_rock(self) -> bool {
        matches!(self, Material::Stone | Material::Deepslate)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Material::Air => "air",
            Material::Stone => "stone",
            Material::Deepslate => "deepslate",
            Material::Bedrock => "bedrock",
            Material::Water => "water",
            Material::Lava => "lava",
            Material::Dirt => "dirt",
            Material::Grass => "grass",
            Material::Sand => "sand",
            Material::Gravel => "gravel",
            Material::Snow => "snow",
            Material::CopperOre => "copper_ore",
            Material::RawCopperBlock => "raw_copper_block",
            Material::Granite => "granite",
            Material::IronOre => "iron_ore",
            Material::RawIronBlock => "raw_iron_block",
            Material::Tuff => "tuff",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterialParseError(pub String);

impl fmt::Display for MaterialParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown material `{}`", self.0)
    }
}

impl std::error::Error for MaterialParseError {}

impl FromStr for Material {
    type Err = MaterialParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or_else(|| MaterialParseError(s.to_string()))
    }
}
