use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use strata_blocks::Material;
use thiserror::Error;

use crate::CHUNK_WIDTH;
use crate::noise::OctaveRange;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("world height must be positive, got {0}")]
    NonPositiveHeight(i32),
    #[error("coarse resolutions must be positive (horizontal {horizontal}, vertical {vertical})")]
    NonPositiveResolution { horizontal: i32, vertical: i32 },
    #[error("vertical resolution {resolution} does not divide world height {height}")]
    VerticalResolution { resolution: i32, height: i32 },
    #[error("horizontal resolution {0} does not divide the chunk width {}", CHUNK_WIDTH)]
    HorizontalResolution(i32),
    #[error("world bounds overflow: min_y {min_y} + height {height}")]
    Bounds { min_y: i32, height: i32 },
    #[error("sea level {sea_level} lies outside the world [{min_y}, {max_y}]")]
    SeaLevel { sea_level: i32, min_y: i32, max_y: i32 },
    #[error("default fluid `{0}` is not a fluid")]
    NotAFluid(Material),
    #[error("default rock `{0}` does not block motion")]
    NotARock(Material),
    #[error("octave range for `{0}` has no amplitudes")]
    EmptyOctaves(&'static str),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid worldgen config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default)]
    pub shape: Shape,
    #[serde(default)]
    pub noise: Noise,
    #[serde(default)]
    pub surface: Surface,
    #[serde(default)]
    pub bedrock: Bedrock,
    #[serde(default)]
    pub rock: Rock,
    #[serde(default)]
    pub biome: BiomeShape,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Shape {
    #[serde(default = "default_min_y")]
    pub min_y: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    #[serde(default = "default_horizontal_resolution")]
    pub horizontal_resolution: i32,
    #[serde(default = "default_vertical_resolution")]
    pub vertical_resolution: i32,
    #[serde(default = "default_sea_level")]
    pub sea_level: i32,
    #[serde(default)]
    pub simplex_surface_noise: bool,
    #[serde(default)]
    pub island_override: bool,
    #[serde(default = "d_true")]
    pub aquifers: bool,
    #[serde(default = "d_true")]
    pub ore_veins: bool,
    #[serde(default = "d_true")]
    pub noodle_caves: bool,
    #[serde(default = "default_rock")]
    pub default_rock: Material,
    #[serde(default = "default_fluid")]
    pub default_fluid: Material,
}
fn default_min_y() -> i32 {
    -64
}
fn default_height() -> i32 {
    384
}
fn default_horizontal_resolution() -> i32 {
    4
}
fn default_vertical_resolution() -> i32 {
    8
}
fn default_sea_level() -> i32 {
    63
}
fn d_true() -> bool {
    true
}
fn default_rock() -> Material {
    Material::Stone
}
fn default_fluid() -> Material {
    Material::Water
}
impl Default for Shape {
    fn default() -> Self {
        Self {
            min_y: default_min_y(),
            height: default_height(),
            horizontal_resolution: default_horizontal_resolution(),
            vertical_resolution: default_vertical_resolution(),
            sea_level: default_sea_level(),
            simplex_surface_noise: false,
            island_override: false,
            aquifers: true,
            ore_veins: true,
            noodle_caves: true,
            default_rock: default_rock(),
            default_fluid: default_fluid(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Noise {
    #[serde(default = "default_shape_octaves")]
    pub shape: OctaveRange,
    #[serde(default = "default_detail_octaves")]
    pub detail: OctaveRange,
    #[serde(default = "default_detail_amplitude")]
    pub detail_amplitude: f64,
    #[serde(default = "d_one")]
    pub xz_scale: f64,
    #[serde(default = "d_one")]
    pub y_scale: f64,
    #[serde(default = "default_falloff")]
    pub vertical_falloff: f64,
    #[serde(default = "default_surface_octaves")]
    pub surface_depth: OctaveRange,
}
fn default_shape_octaves() -> OctaveRange {
    OctaveRange::new(-7, &[1.0, 1.0, 1.0, 1.0])
}
fn default_detail_octaves() -> OctaveRange {
    OctaveRange::new(-4, &[1.0, 1.0])
}
fn default_detail_amplitude() -> f64 {
    0.15
}
fn d_one() -> f64 {
    1.0
}
fn default_falloff() -> f64 {
    48.0
}
fn default_surface_octaves() -> OctaveRange {
    OctaveRange::new(-6, &[1.0, 1.0, 1.0])
}
impl Default for Noise {
    fn default() -> Self {
        Self {
            shape: default_shape_octaves(),
            detail: default_detail_octaves(),
            detail_amplitude: default_detail_amplitude(),
            xz_scale: 1.0,
            y_scale: 1.0,
            vertical_falloff: default_falloff(),
            surface_depth: default_surface_octaves(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Surface {
    #[serde(default = "default_snow_line")]
    pub snow_line: i32,
    #[serde(default = "default_beach_height")]
    pub beach_height: i32,
    #[serde(default = "default_depth_base")]
    pub depth_base: f64,
    #[serde(default = "default_depth_noise")]
    pub depth_noise: f64,
    #[serde(default = "default_top_names")]
    pub top: TopNames,
    #[serde(default = "default_under")]
    pub under: Material,
    #[serde(default = "default_underwater")]
    pub underwater: Material,
}
#[derive(Clone, Debug, Deserialize)]
pub struct TopNames {
    pub high: Material,
    pub low: Material,
    pub mid: Material,
}
fn default_snow_line() -> i32 {
    160
}
fn default_beach_height() -> i32 {
    2
}
fn default_depth_base() -> f64 {
    3.0
}
fn default_depth_noise() -> f64 {
    2.8
}
fn default_top_names() -> TopNames {
    TopNames {
        high: Material::Snow,
        low: Material::Sand,
        mid: Material::Grass,
    }
}
fn default_under() -> Material {
    Material::Dirt
}
fn default_underwater() -> Material {
    Material::Gravel
}
impl Default for Surface {
    fn default() -> Self {
        Self {
            snow_line: default_snow_line(),
            beach_height: default_beach_height(),
            depth_base: default_depth_base(),
            depth_noise: default_depth_noise(),
            top: default_top_names(),
            under: default_under(),
            underwater: default_underwater(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Bedrock {
    #[serde(default = "d_true")]
    pub floor: bool,
    #[serde(default)]
    pub roof: bool,
}
impl Default for Bedrock {
    fn default() -> Self {
        Self {
            floor: true,
            roof: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Rock {
    #[serde(default = "default_deep_rock")]
    pub deep: Material,
    #[serde(default = "default_transition_top")]
    pub transition_top: i32,
    #[serde(default)]
    pub transition_bottom: i32,
}
fn default_deep_rock() -> Material {
    Material::Deepslate
}
fn default_transition_top() -> i32 {
    8
}
impl Default for Rock {
    fn default() -> Self {
        Self {
            deep: default_deep_rock(),
            transition_top: default_transition_top(),
            transition_bottom: 0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct BiomeShape {
    #[serde(default)]
    pub depth: f64,
    #[serde(default = "d_one")]
    pub scale: f64,
    #[serde(default)]
    pub features: Vec<String>,
}
impl Default for BiomeShape {
    fn default() -> Self {
        Self {
            depth: 0.0,
            scale: 1.0,
            features: Vec::new(),
        }
    }
}

/// Immutable, validated terrain shape shared by every chunk of a world.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeConfig {
    pub min_y: i32,
    pub height: i32,
    pub horizontal_resolution: i32,
    pub vertical_resolution: i32,
    pub sea_level: i32,
    pub simplex_surface_noise: bool,
    pub island_override: bool,
    pub aquifers_enabled: bool,
    pub ore_veins_enabled: bool,
    pub noodle_caves_enabled: bool,
    pub default_rock: Material,
    pub default_fluid: Material,
}

impl ShapeConfig {
    pub fn from_config(cfg: &Shape) -> Result<Self, ConfigError> {
        if cfg.height <= 0 {
            return Err(ConfigError::NonPositiveHeight(cfg.height));
        }
        if cfg.horizontal_resolution <= 0 || cfg.vertical_resolution <= 0 {
            return Err(ConfigError::NonPositiveResolution {
                horizontal: cfg.horizontal_resolution,
                vertical: cfg.vertical_resolution,
            });
        }
        if cfg.height % cfg.vertical_resolution != 0 {
            return Err(ConfigError::VerticalResolution {
                resolution: cfg.vertical_resolution,
                height: cfg.height,
            });
        }
        if CHUNK_WIDTH as i32 % cfg.horizontal_resolution != 0 {
            return Err(ConfigError::HorizontalResolution(cfg.horizontal_resolution));
        }
        let max_y = cfg
            .min_y
            .checked_add(cfg.height)
            .ok_or(ConfigError::Bounds {
                min_y: cfg.min_y,
                height: cfg.height,
            })?;
        if cfg.sea_level < cfg.min_y || cfg.sea_level > max_y {
            return Err(ConfigError::SeaLevel {
                sea_level: cfg.sea_level,
                min_y: cfg.min_y,
                max_y,
            });
        }
        if !cfg.default_fluid.is_fluid() {
            return Err(ConfigError::NotAFluid(cfg.default_fluid));
        }
        if !cfg.default_rock.blocks_motion() {
            return Err(ConfigError::NotARock(cfg.default_rock));
        }
        Ok(Self {
            min_y: cfg.min_y,
            height: cfg.height,
            horizontal_resolution: cfg.horizontal_resolution,
            vertical_resolution: cfg.vertical_resolution,
            sea_level: cfg.sea_level,
            simplex_surface_noise: cfg.simplex_surface_noise,
            island_override: cfg.island_override,
            aquifers_enabled: cfg.aquifers,
            ore_veins_enabled: cfg.ore_veins,
            noodle_caves_enabled: cfg.noodle_caves,
            default_rock: cfg.default_rock,
            default_fluid: cfg.default_fluid,
        })
    }

    /// One past the topmost block.
    #[inline]
    pub fn max_y(&self) -> i32 {
        self.min_y + self.height
    }

    #[inline]
    pub fn cell_count_y(&self) -> usize {
        (self.height / self.vertical_resolution) as usize
    }

    #[inline]
    pub fn cell_count_xz(&self) -> usize {
        CHUNK_WIDTH / self.horizontal_resolution as usize
    }
}

// Flattened params used in tight loops (snapshot of config)
#[derive(Clone, Debug)]
pub struct WorldGenParams {
    pub shape: ShapeConfig,
    pub shape_octaves: OctaveRange,
    pub detail_octaves: OctaveRange,
    pub detail_amplitude: f64,
    pub xz_scale: f64,
    pub y_scale: f64,
    pub vertical_falloff: f64,
    pub surface_depth_octaves: OctaveRange,
    pub snow_line: i32,
    pub beach_height: i32,
    pub depth_base: f64,
    pub depth_noise: f64,
    pub top_high: Material,
    pub top_low: Material,
    pub top_mid: Material,
    pub under: Material,
    pub underwater: Material,
    pub bedrock_floor: bool,
    pub bedrock_roof: bool,
    pub deep_rock: Material,
    pub rock_transition_top: i32,
    pub rock_transition_bottom: i32,
    pub biome_depth: f64,
    pub biome_scale: f64,
    pub biome_features: Vec<String>,
}

impl WorldGenParams {
    pub fn from_config(cfg: &WorldGenConfig) -> Result<Self, ConfigError> {
        let shape = ShapeConfig::from_config(&cfg.shape)?;
        for (name, range) in [
            ("noise.shape", &cfg.noise.shape),
            ("noise.detail", &cfg.noise.detail),
            ("noise.surface_depth", &cfg.noise.surface_depth),
        ] {
            if range.amplitudes.is_empty() {
                return Err(ConfigError::EmptyOctaves(name));
            }
        }
        Ok(Self {
            shape,
            shape_octaves: cfg.noise.shape.clone(),
            detail_octaves: cfg.noise.detail.clone(),
            detail_amplitude: cfg.noise.detail_amplitude,
            xz_scale: cfg.noise.xz_scale,
            y_scale: cfg.noise.y_scale,
            vertical_falloff: cfg.noise.vertical_falloff.max(1.0),
            surface_depth_octaves: cfg.noise.surface_depth.clone(),
            snow_line: cfg.surface.snow_line,
            beach_height: cfg.surface.beach_height,
            depth_base: cfg.surface.depth_base,
            depth_noise: cfg.surface.depth_noise,
            top_high: cfg.surface.top.high,
            top_low: cfg.surface.top.low,
            top_mid: cfg.surface.top.mid,
            under: cfg.surface.under,
            underwater: cfg.surface.underwater,
            bedrock_floor: cfg.bedrock.floor,
            bedrock_roof: cfg.bedrock.roof,
            deep_rock: cfg.rock.deep,
            rock_transition_top: cfg.rock.transition_top,
            rock_transition_bottom: cfg.rock.transition_bottom,
            biome_depth: cfg.biome.depth,
            biome_scale: cfg.biome.scale,
            biome_features: cfg.biome.features.clone(),
        })
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: WorldGenConfig = toml::from_str(s)?;
        Self::from_config(&cfg)
    }
}

impl Default for WorldGenParams {
    fn default() -> Self {
        // The built-in defaults are a valid shape.
        match Self::from_config(&WorldGenConfig::default()) {
            Ok(p) => p,
            Err(e) => unreachable!("default worldgen config rejected: {e}"),
        }
    }
}

pub fn load_params_from_path(path: &Path) -> Result<WorldGenParams, ConfigError> {
    let s = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    WorldGenParams::from_toml_str(&s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let p = WorldGenParams::default();
        assert_eq!(p.shape.min_y, -64);
        assert_eq!(p.shape.cell_count_y(), 48);
        assert_eq!(p.shape.cell_count_xz(), 4);
    }

    #[test]
    fn zero_height_is_rejected() {
        let err = WorldGenParams::from_toml_str("[shape]\nheight = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveHeight(0)));
    }

    #[test]
    fn resolution_must_divide_height() {
        let err =
            WorldGenParams::from_toml_str("[shape]\nheight = 100\nvertical_resolution = 8\n")
                .unwrap_err();
        assert!(matches!(err, ConfigError::VerticalResolution { .. }));
    }

    #[test]
    fn resolution_must_divide_chunk_width() {
        let err =
            WorldGenParams::from_toml_str("[shape]\nhorizontal_resolution = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::HorizontalResolution(3)));
    }

    #[test]
    fn fluid_must_be_fluid() {
        let err =
            WorldGenParams::from_toml_str("[shape]\ndefault_fluid = \"stone\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::NotAFluid(Material::Stone)));
    }

    #[test]
    fn sea_level_must_be_inside_world() {
        let err = WorldGenParams::from_toml_str("[shape]\nsea_level = 1000\n").unwrap_err();
        assert!(matches!(err, ConfigError::SeaLevel { .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = WorldGenParams::from_toml_str("[shape\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let p = WorldGenParams::from_toml_str(
            "[shape]\naquifers = false\n[surface]\nunder = \"sand\"\n",
        )
        .unwrap();
        assert!(!p.shape.aquifers_enabled);
        assert!(p.shape.ore_veins_enabled);
        assert_eq!(p.under, Material::Sand);
        assert_eq!(p.top_mid, Material::Grass);
    }
}
