// Feature module - persisted feature container
//
// On-disk layout: a fixed header of u32 frame count, u32 feature dimension,
// and u64 element byte size, followed by frame-major little-endian f32 data.
// The element size field lets a loader reject containers written with a
// different precision.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Byte size of one stored element
pub const ELEMENT_BYTES: u64 = std::mem::size_of::<f32>() as u64;

/// A frame-major matrix of extracted features
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    num_frames: u32,
    feature_dim: u32,
    data: Vec<f32>,
}

impl FeatureSet {
    /// Create a zero-filled container for `num_frames` frames of
    /// `feature_dim` elements each.
    pub fn new(num_frames: u32, feature_dim: u32) -> Self {
        Self {
            num_frames,
            feature_dim,
            data: vec![0.0; num_frames as usize * feature_dim as usize],
        }
    }

    pub fn num_frames(&self) -> u32 {
        self.num_frames
    }

    pub fn feature_dim(&self) -> u32 {
        self.feature_dim
    }

    /// One frame's features, or `None` past the end.
    pub fn frame(&self, index: u32) -> Option<&[f32]> {
        if index >= self.num_frames {
            return None;
        }
        let dim = self.feature_dim as usize;
        let offset = index as usize * dim;
        Some(&self.data[offset..offset + dim])
    }

    /// Mutable access to one frame's features, or `None` past the end.
    pub fn frame_mut(&mut self, index: u32) -> Option<&mut [f32]> {
        if index >= self.num_frames {
            return None;
        }
        let dim = self.feature_dim as usize;
        let offset = index as usize * dim;
        Some(&mut self.data[offset..offset + dim])
    }

    /// Write the container to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        writer.write_all(&self.num_frames.to_le_bytes())?;
        writer.write_all(&self.feature_dim.to_le_bytes())?;
        writer.write_all(&ELEMENT_BYTES.to_le_bytes())?;
        for value in &self.data {
            writer.write_all(&value.to_le_bytes())?;
        }
        writer
            .flush()
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Read a container from `path`, rejecting element-size mismatches and
    /// truncated payloads.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mut reader = BufReader::new(file);

        let mut u32_buf = [0u8; 4];
        reader.read_exact(&mut u32_buf)?;
        let num_frames = u32::from_le_bytes(u32_buf);
        reader.read_exact(&mut u32_buf)?;
        let feature_dim = u32::from_le_bytes(u32_buf);

        let mut u64_buf = [0u8; 8];
        reader.read_exact(&mut u64_buf)?;
        let element_bytes = u64::from_le_bytes(u64_buf);
        if element_bytes != ELEMENT_BYTES {
            bail!(
                "{}: element size mismatch (expected {}, found {})",
                path.display(),
                ELEMENT_BYTES,
                element_bytes
            );
        }

        let count = num_frames as usize * feature_dim as usize;
        let mut data = Vec::with_capacity(count);
        for _ in 0..count {
            reader
                .read_exact(&mut u32_buf)
                .with_context(|| format!("{}: truncated feature data", path.display()))?;
            data.push(f32::from_le_bytes(u32_buf));
        }

        Ok(Self {
            num_frames,
            feature_dim,
            data,
        })
    }
}
