use half::f16;

use crate::dtype::DType;
use crate::error::{Result, TensorError};

/// CPU-side tensor storage.
///
/// Input tensors are always F32. Logits coming back from a packaged model
/// may be F32 or F16; F16 data is widened to f32 when read.
#[derive(Debug, Clone)]
pub enum CpuStorage {
    /// 32-bit floating point storage.
    F32(Vec<f32>),
    /// 16-bit floating point storage.
    F16(Vec<f16>),
}

impl CpuStorage {
    /// Number of elements in this storage.
    pub fn len(&self) -> usize {
        match self {
            CpuStorage::F32(v) => v.len(),
            CpuStorage::F16(v) => v.len(),
        }
    }

    /// Returns true if the storage contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the data as an f32 slice.
    ///
    /// # Errors
    /// Returns an error if the storage is not F32.
    pub fn as_f32_slice(&self) -> Result<&[f32]> {
        match self {
            CpuStorage::F32(v) => Ok(v.as_slice()),
            CpuStorage::F16(_) => Err(TensorError::DTypeMismatch {
                expected: DType::F32.to_string(),
                got: DType::F16.to_string(),
            }),
        }
    }

    /// Returns the data as a mutable f32 slice.
    ///
    /// # Errors
    /// Returns an error if the storage is not F32.
    pub fn as_f32_slice_mut(&mut self) -> Result<&mut [f32]> {
        match self {
            CpuStorage::F32(v) => Ok(v.as_mut_slice()),
            CpuStorage::F16(_) => Err(TensorError::DTypeMismatch {
                expected: DType::F32.to_string(),
                got: DType::F16.to_string(),
            }),
        }
    }

    /// Copy `len` elements starting at `start` into an owned f32 vector,
    /// widening F16 data on read.
    ///
    /// # Errors
    /// Returns an error if the range extends past the end of the storage,
    /// or if the output allocation fails.
    pub fn gather_f32(&self, start: usize, len: usize) -> Result<Vec<f32>> {
        let end = start
            .checked_add(len)
            .ok_or(TensorError::IndexOutOfBounds {
                index: start,
                len: self.len(),
            })?;
        if end > self.len() {
            return Err(TensorError::IndexOutOfBounds {
                index: end,
                len: self.len(),
            });
        }

        let mut out = Vec::new();
        out.try_reserve_exact(len)
            .map_err(|_| TensorError::Allocation { elems: len })?;
        match self {
            CpuStorage::F32(v) => out.extend_from_slice(&v[start..end]),
            CpuStorage::F16(v) => out.extend(v[start..end].iter().map(|h| h.to_f32())),
        }
        Ok(out)
    }

    /// Create zero-filled storage for the given dtype and element count.
    ///
    /// Allocation is fallible: running out of memory surfaces as
    /// `TensorError::Allocation` instead of aborting the process.
    pub fn zeros(dtype: DType, n: usize) -> Result<Self> {
        match dtype {
            DType::F32 => {
                let mut v: Vec<f32> = Vec::new();
                v.try_reserve_exact(n)
                    .map_err(|_| TensorError::Allocation { elems: n })?;
                v.resize(n, 0.0);
                Ok(CpuStorage::F32(v))
            }
            DType::F16 => {
                let mut v: Vec<f16> = Vec::new();
                v.try_reserve_exact(n)
                    .map_err(|_| TensorError::Allocation { elems: n })?;
                v.resize(n, f16::ZERO);
                Ok(CpuStorage::F16(v))
            }
        }
    }

    /// Create storage from an f32 vector.
    pub fn from_f32_vec(data: Vec<f32>) -> Self {
        CpuStorage::F32(data)
    }

    /// Create storage from an f16 vector.
    pub fn from_f16_vec(data: Vec<f16>) -> Self {
        CpuStorage::F16(data)
    }

    /// Returns the dtype of this storage.
    pub fn dtype(&self) -> DType {
        match self {
            CpuStorage::F32(_) => DType::F32,
            CpuStorage::F16(_) => DType::F16,
        }
    }
}
