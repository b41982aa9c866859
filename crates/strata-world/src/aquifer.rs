//! Underground fluid placement.
//!
//! Fluid pools are anchored at jittered control points on a grid of 16x12x16 block
//! cells. Every point carries a lazily computed fluid level. A block with
//! non-positive density takes the level of its nearest point, while boundaries
//! between disagreeing neighbours get a solid barrier blended in from the edge noise.

use fastnoise_lite::NoiseType;
use hashbrown::HashMap;
use rand::Rng;
use strata_blocks::Material;

use crate::config::ShapeConfig;
use crate::noise::{CoherentNoiseField, NoiseKey, OctaveRange};
use crate::random::{derive_seed, floor_div, positional_rng};
use crate::rock::RockSource;

const CELL_XZ: i32 = 16;
const CELL_Y: i32 = 12;
const JITTER_XZ: i32 = 10;
const JITTER_Y: i32 = 9;
const BOTTOM_LAVA_RANGE: i32 = 9;
const EDGE_FALLOFF: f64 = 25.0;
const LEVEL_STEP: i32 = 40;
const SURFACE_POINT_Y: i32 = 30;
const LEVEL_OFFSET_MIN: i32 = -10;
const LEVEL_OFFSET_SPAN: f64 = 30.0;
const JITTER_SALT: u64 = 0x4151_5549_4a49_0001;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FluidLevel {
    pub surface_y: i32,
    pub fluid: Material,
}

impl FluidLevel {
    #[inline]
    pub fn at(&self, y: i32) -> Material {
        if y < self.surface_y {
            self.fluid
        } else {
            Material::Air
        }
    }
}

/// Jittered anchor of one aquifer cell with its memoized level.
#[derive(Clone, Copy, Debug)]
pub struct FluidControlPoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub level: Option<FluidLevel>,
}

pub struct AquiferFields {
    level: CoherentNoiseField,
    kind: CoherentNoiseField,
    edge: CoherentNoiseField,
    jitter_seed: u64,
}

impl AquiferFields {
    pub fn new(seed: u64) -> Self {
        Self {
            level: CoherentNoiseField::with_noise_type(
                seed,
                NoiseKey::AquiferLevel,
                &OctaveRange::new(-1, &[1.0, 1.0]),
                NoiseType::OpenSimplex2,
            ),
            kind: CoherentNoiseField::with_noise_type(
                seed,
                NoiseKey::AquiferType,
                &OctaveRange::single(-1),
                NoiseType::OpenSimplex2,
            ),
            edge: CoherentNoiseField::new(seed, NoiseKey::AquiferEdge, &OctaveRange::single(-3)),
            jitter_seed: derive_seed(seed, JITTER_SALT),
        }
    }
}

/// Resolves a composed density weight into the block placed there.
pub enum AquiferResolver<'g> {
    /// Flat ocean at sea level, used when aquifers are disabled.
    SeaLevel(SeaLevelAquifer),
    Noise(NoiseAquifer<'g>),
}

impl<'g> AquiferResolver<'g> {
    pub fn for_shape(shape: &ShapeConfig, fields: &'g AquiferFields) -> Self {
        if shape.aquifers_enabled {
            AquiferResolver::Noise(NoiseAquifer::new(shape, fields))
        } else {
            AquiferResolver::SeaLevel(SeaLevelAquifer::new(shape))
        }
    }

    /// Fluid or air for the block, or `None` where it stays solid.
    pub fn classify(&mut self, x: i32, y: i32, z: i32, weight: f64) -> Option<Material> {
        match self {
            AquiferResolver::SeaLevel(a) => a.classify(y, weight),
            AquiferResolver::Noise(a) => a.classify(x, y, z, weight),
        }
    }

    pub fn apply<R: RockSource + ?Sized>(
        &mut self,
        rock: &R,
        x: i32,
        y: i32,
        z: i32,
        weight: f64,
    ) -> Material {
        match self.classify(x, y, z, weight) {
            Some(m) => m,
            None => rock.sample(x, y, z),
        }
    }

    /// Control points memoized so far; zero for the sea-level stub.
    pub fn cached_points(&self) -> usize {
        match self {
            AquiferResolver::SeaLevel(_) => 0,
            AquiferResolver::Noise(a) => a.cached_points(),
        }
    }

    /// Whether the block last resolved is a fluid on a blended boundary.
    pub fn needs_fluid_tick(&self) -> bool {
        match self {
            AquiferResolver::SeaLevel(_) => false,
            AquiferResolver::Noise(a) => a.needs_tick,
        }
    }
}

#[inline]
fn bottom_lava(y: i32, min_y: i32) -> bool {
    y - min_y <= BOTTOM_LAVA_RANGE
}

pub struct SeaLevelAquifer {
    min_y: i32,
    level: FluidLevel,
}

impl SeaLevelAquifer {
    pub fn new(shape: &ShapeConfig) -> Self {
        Self {
            min_y: shape.min_y,
            level: FluidLevel {
                surface_y: shape.sea_level,
                fluid: shape.default_fluid,
            },
        }
    }

    fn classify(&self, y: i32, weight: f64) -> Option<Material> {
        if weight > 0.0 {
            None
        } else if bottom_lava(y, self.min_y) {
            Some(Material::Lava)
        } else {
            Some(self.level.at(y))
        }
    }
}

#[derive(Clone, Copy)]
struct Nearest {
    dist: i64,
    cell: (i32, i32, i32),
}

const NONE_NEAREST: Nearest = Nearest {
    dist: i64::MAX,
    cell: (0, 0, 0),
};

pub struct NoiseAquifer<'g> {
    fields: &'g AquiferFields,
    min_y: i32,
    sea_level: i32,
    default_fluid: Material,
    lowest_step: i32,
    points: HashMap<(i32, i32, i32), FluidControlPoint>,
    needs_tick: bool,
}

impl<'g> NoiseAquifer<'g> {
    pub fn new(shape: &ShapeConfig, fields: &'g AquiferFields) -> Self {
        Self {
            fields,
            min_y: shape.min_y,
            sea_level: shape.sea_level,
            default_fluid: shape.default_fluid,
            lowest_step: floor_div(shape.min_y, LEVEL_STEP),
            points: HashMap::new(),
            needs_tick: false,
        }
    }

    /// Control points memoized so far.
    pub fn cached_points(&self) -> usize {
        self.points.len()
    }

    fn point(&mut self, cell: (i32, i32, i32)) -> FluidControlPoint {
        let seed = self.fields.jitter_seed;
        *self.points.entry(cell).or_insert_with(|| {
            let (gx, gy, gz) = cell;
            let mut rng = positional_rng(seed, gx, gy, gz);
            FluidControlPoint {
                x: gx * CELL_XZ + rng.gen_range(0..JITTER_XZ),
                y: gy * CELL_Y + rng.gen_range(0..JITTER_Y),
                z: gz * CELL_XZ + rng.gen_range(0..JITTER_XZ),
                level: None,
            }
        })
    }

    fn level(&mut self, cell: (i32, i32, i32)) -> FluidLevel {
        let p = self.point(cell);
        if let Some(level) = p.level {
            return level;
        }
        let level = self.compute_level(p.x, p.y, p.z);
        if let Some(slot) = self.points.get_mut(&cell) {
            slot.level = Some(level);
        }
        level
    }

    fn compute_level(&self, px: i32, py: i32, pz: i32) -> FluidLevel {
        if py > SURFACE_POINT_Y {
            return FluidLevel {
                surface_y: self.sea_level,
                fluid: self.default_fluid,
            };
        }
        let step = floor_div(py, LEVEL_STEP);
        let base = step * LEVEL_STEP;
        let (cx, cy, cz) = (
            f64::from(floor_div(px, CELL_XZ)),
            f64::from(step),
            f64::from(floor_div(pz, CELL_XZ)),
        );
        let n = self.fields.level.sample(cx, cy, cz).clamp(-1.0, 1.0);
        let offset = LEVEL_OFFSET_MIN + ((n + 1.0) * 0.5 * LEVEL_OFFSET_SPAN).floor() as i32;
        let surface_y = (base + offset).min(self.sea_level);
        let fluid = if step <= self.lowest_step && self.fields.kind.sample(cx, cy, cz) > 0.0 {
            Material::Lava
        } else {
            self.default_fluid
        };
        FluidLevel { surface_y, fluid }
    }

    fn classify(&mut self, x: i32, y: i32, z: i32, weight: f64) -> Option<Material> {
        if weight > 0.0 {
            self.needs_tick = false;
            return None;
        }
        if bottom_lava(y, self.min_y) {
            self.needs_tick = false;
            return Some(Material::Lava);
        }

        let ax = floor_div(x - 5, CELL_XZ);
        let ay = floor_div(y + 1, CELL_Y);
        let az = floor_div(z - 5, CELL_XZ);
        let mut best = [NONE_NEAREST; 3];
        for gx in 0..=1 {
            for gy in -1..=1 {
                for gz in 0..=1 {
                    let cell = (ax + gx, ay + gy, az + gz);
                    let p = self.point(cell);
                    let (dx, dy, dz) = (
                        i64::from(p.x - x),
                        i64::from(p.y - y),
                        i64::from(p.z - z),
                    );
                    insert_nearest(&mut best, Nearest {
                        dist: dx * dx + dy * dy + dz * dz,
                        cell,
                    });
                }
            }
        }

        let l1 = self.level(best[0].cell);
        let levels = [
            l1,
            self.level_or(best[1], l1),
            self.level_or(best[2], l1),
        ];
        let f12 = falloff(best[0].dist, best[1].dist);
        let f13 = falloff(best[0].dist, best[2].dist);
        let f23 = falloff(best[1].dist, best[2].dist);

        let mut edge = None;
        let mut pair = |a: FluidLevel, b: FluidLevel, w: f64| -> f64 {
            if w <= 0.0 || levels_agree(a, b, y) {
                return 0.0;
            }
            let e = *edge.get_or_insert_with(|| {
                self.fields
                    .edge
                    .sample(f64::from(x), f64::from(y), f64::from(z))
                    .clamp(-1.0, 1.0)
            });
            w * (1.0 + e)
        };
        let bonus = pair(levels[0], levels[1], f12)
            .max(pair(levels[0], levels[2], f12 * f13))
            .max(pair(levels[1], levels[2], f12 * f23))
            .max(0.0);

        if weight + bonus > 0.0 {
            self.needs_tick = false;
            return None;
        }
        let mut material = l1.at(y);
        if material == Material::Water && bottom_lava(y - 1, self.min_y) {
            material = Material::Lava;
        }
        self.needs_tick = material.is_fluid() && f12 > 0.0;
        Some(material)
    }

    fn level_or(&mut self, n: Nearest, fallback: FluidLevel) -> FluidLevel {
        if n.dist == i64::MAX {
            fallback
        } else {
            self.level(n.cell)
        }
    }

    #[cfg(test)]
    pub(crate) fn preset_level(&mut self, cell: (i32, i32, i32), level: FluidLevel) {
        let mut p = self.point(cell);
        p.level = Some(level);
        self.points.insert(cell, p);
    }
}

/// Same fluid with both surfaces at or above `y`: no pressure between the two pools.
#[inline]
fn levels_agree(a: FluidLevel, b: FluidLevel, y: i32) -> bool {
    a == b || (a.fluid == b.fluid && a.surface_y >= y && b.surface_y >= y)
}

/// Keeps `best` sorted ascending by distance, dropping the farthest.
#[inline]
fn insert_nearest(best: &mut [Nearest; 3], n: Nearest) {
    if n.dist >= best[2].dist {
        return;
    }
    let mut i = 2;
    while i > 0 && n.dist < best[i - 1].dist {
        best[i] = best[i - 1];
        i -= 1;
    }
    best[i] = n;
}

#[inline]
fn falloff(near: i64, far: i64) -> f64 {
    if near == i64::MAX || far == i64::MAX {
        return 0.0;
    }
    (1.0 - (far - near) as f64 / EDGE_FALLOFF).clamp(0.0, 1.0)
}
