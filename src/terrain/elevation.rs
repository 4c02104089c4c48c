//! Elevation collaborators feeding the navigation grid.
//!
//! The grid samples heights at normalized source coordinates `(u, v)` in
//! `[0, 1]`. Decoding image files is the host's job; these adapters only
//! interpret buffers that are already in memory.

use super::error::{TerrainError, TerrainResult};

/// Keeps `i / n * n` from flooring to `i - 1` under f32 rounding.
const SAMPLE_EPSILON: f32 = 1e-4;

/// Maximum value of one 8-bit channel.
pub const MAX_INTENSITY: f32 = 255.0;

/// Anything that can answer "how high is the terrain at (u, v)".
///
/// Heights are expected in `[0, 1]`. An error means the source has no usable
/// data; the grid then decides whether to fall back to a flat field.
pub trait ElevationSource {
    fn sample(&self, u: f32, v: f32) -> TerrainResult<f32>;
}

impl<F> ElevationSource for F
where
    F: Fn(f32, f32) -> f32,
{
    fn sample(&self, u: f32, v: f32) -> TerrainResult<f32> {
        Ok(self(u, v))
    }
}

/// Map a normalized coordinate onto `0..extent` by flooring.
fn sample_index(t: f32, extent: usize) -> usize {
    if !t.is_finite() {
        return 0;
    }
    let scaled = (t.clamp(0.0, 1.0) * extent as f32 + SAMPLE_EPSILON).floor() as usize;
    scaled.min(extent.saturating_sub(1))
}

/// A decoded 8-bit image used as a heightmap.
///
/// Uses the inverted intensity convention: black is the highest point,
/// white the lowest. Alpha (the last channel of 2 and 4 channel images) is
/// ignored.
#[derive(Clone, Debug)]
pub struct IntensityImage {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub pixels: Vec<u8>,
}

impl IntensityImage {
    pub fn new(width: usize, height: usize, channels: usize, pixels: Vec<u8>) -> Self {
        Self { width, height, channels, pixels }
    }

    /// Channels that carry intensity (alpha excluded).
    pub fn intensity_channels(&self) -> usize {
        match self.channels {
            2 | 4 => self.channels - 1,
            c => c,
        }
    }

    fn validate(&self) -> TerrainResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TerrainError::elevation("heightmap has no pixels"));
        }
        if !(1..=4).contains(&self.channels) {
            return Err(TerrainError::elevation(format!(
                "unsupported channel count {}",
                self.channels
            )));
        }
        let expected = self.width * self.height * self.channels;
        if self.pixels.len() < expected {
            return Err(TerrainError::elevation(format!(
                "heightmap buffer holds {} bytes, expected {}",
                self.pixels.len(),
                expected
            )));
        }
        Ok(())
    }
}

impl ElevationSource for IntensityImage {
    fn sample(&self, u: f32, v: f32) -> TerrainResult<f32> {
        self.validate()?;

        let x = sample_index(u, self.width);
        let z = sample_index(v, self.height);
        let base = (x + z * self.width) * self.channels;

        let channels = self.intensity_channels();
        let total: f32 = self.pixels[base..base + channels]
            .iter()
            .map(|&c| c as f32)
            .sum();

        let channels = channels as f32;
        Ok((MAX_INTENSITY * channels - total) / (channels * MAX_INTENSITY))
    }
}

/// Row-major grid of already-normalized heights, sampled nearest-cell.
#[derive(Clone, Debug)]
pub struct ElevationGrid {
    pub width: usize,
    pub depth: usize,
    /// Indexed `z * width + x`.
    pub heights: Vec<f32>,
}

impl ElevationGrid {
    pub fn from_raw(heights: Vec<f32>, width: usize, depth: usize) -> Self {
        Self { width, depth, heights }
    }

    pub fn from_fn(width: usize, depth: usize, f: impl Fn(usize, usize) -> f32) -> Self {
        let mut heights = Vec::with_capacity(width * depth);
        for z in 0..depth {
            for x in 0..width {
                heights.push(f(x, z));
            }
        }
        Self { width, depth, heights }
    }
}

impl ElevationSource for ElevationGrid {
    fn sample(&self, u: f32, v: f32) -> TerrainResult<f32> {
        if self.width == 0 || self.depth == 0 || self.heights.len() < self.width * self.depth {
            return Err(TerrainError::elevation(format!(
                "elevation grid {}x{} holds {} samples",
                self.width,
                self.depth,
                self.heights.len()
            )));
        }
        let x = sample_index(u, self.width);
        let z = sample_index(v, self.depth);
        Ok(self.heights[z * self.width + x])
    }
}
