//! Biome collaborators: shape overrides for density and surface dressing rules.

use strata_blocks::Material;

use crate::config::WorldGenParams;

/// Per-biome adjustments to the density gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeOverrides {
    /// Shifts the zero-density level up (positive) or down, in units of 32 blocks.
    pub depth: f64,
    /// Stretches the vertical falloff; must be positive.
    pub scale: f64,
}

impl Default for ShapeOverrides {
    fn default() -> Self {
        Self {
            depth: 0.0,
            scale: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SurfaceContext {
    pub x: i32,
    pub z: i32,
    /// Highest solid block of the column.
    pub surface_y: i32,
    pub sea_level: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceLayers {
    pub top: Material,
    pub under: Material,
    pub underwater_top: Material,
}

pub trait Biome: Send + Sync {
    fn shape_overrides(&self) -> ShapeOverrides;
    fn dress_surface(&self, ctx: &SurfaceContext) -> SurfaceLayers;
    fn has_feature(&self, name: &str) -> bool;
}

pub trait BiomeSource: Send + Sync {
    /// `coarse_y` is the vertical cell index counted from the world floor.
    fn biome_at(&self, x: i32, coarse_y: i32, z: i32) -> &dyn Biome;
}

/// Single biome assembled from the `[surface]` and `[biome]` config sections.
#[derive(Clone, Debug)]
pub struct ConfiguredBiome {
    overrides: ShapeOverrides,
    snow_line: i32,
    beach_height: i32,
    top_high: Material,
    top_low: Material,
    top_mid: Material,
    under: Material,
    underwater: Material,
    features: Vec<String>,
}

impl ConfiguredBiome {
    pub fn from_params(params: &WorldGenParams) -> Self {
        Self {
            overrides: ShapeOverrides {
                depth: params.biome_depth,
                scale: if params.biome_scale > 0.0 {
                    params.biome_scale
                } else {
                    1.0
                },
            },
            snow_line: params.snow_line,
            beach_height: params.beach_height,
            top_high: params.top_high,
            top_low: params.top_low,
            top_mid: params.top_mid,
            under: params.under,
            underwater: params.underwater,
            features: params.biome_features.clone(),
        }
    }
}

impl Biome for ConfiguredBiome {
    fn shape_overrides(&self) -> ShapeOverrides {
        self.overrides
    }

    fn dress_surface(&self, ctx: &SurfaceContext) -> SurfaceLayers {
        let top = if ctx.surface_y >= self.snow_line {
            self.top_high
        } else if ctx.surface_y <= ctx.sea_level + self.beach_height {
            self.top_low
        } else {
            self.top_mid
        };
        // Beaches stay sand all the way down.
        let under = if top == self.top_low { top } else { self.under };
        SurfaceLayers {
            top,
            under,
            underwater_top: self.underwater,
        }
    }

    fn has_feature(&self, name: &str) -> bool {
        self.features.iter().any(|f| f == name)
    }
}

/// Biome source that answers the same configured biome everywhere.
#[derive(Clone, Debug)]
pub struct ConfiguredBiomes {
    biome: ConfiguredBiome,
}

impl ConfiguredBiomes {
    pub fn from_params(params: &WorldGenParams) -> Self {
        Self {
            biome: ConfiguredBiome::from_params(params),
        }
    }
}

impl BiomeSource for ConfiguredBiomes {
    fn biome_at(&self, _x: i32, _coarse_y: i32, _z: i32) -> &dyn Biome {
        &self.biome
    }
}
