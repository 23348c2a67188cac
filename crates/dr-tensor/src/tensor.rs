use half::f16;

use crate::dtype::DType;
use crate::error::{Result, TensorError};
use crate::shape::Shape;
use crate::storage::CpuStorage;

/// A tensor backed by CPU storage.
///
/// Holds contiguous, row-major data with an associated shape and dtype.
/// Tensors here are plain data carriers across the model boundary: the
/// padded input window going in, the logits block coming out.
#[derive(Debug, Clone)]
pub struct Tensor {
    storage: CpuStorage,
    shape: Shape,
    dtype: DType,
}

impl Tensor {
    /// Create a new f32 tensor from data and a shape.
    ///
    /// # Panics
    /// Panics if `data.len() != shape.numel()`.
    pub fn new(data: Vec<f32>, shape: Shape) -> Self {
        assert_eq!(
            data.len(),
            shape.numel(),
            "data length {} does not match shape {} (numel={})",
            data.len(),
            shape,
            shape.numel()
        );
        Tensor {
            storage: CpuStorage::from_f32_vec(data),
            shape,
            dtype: DType::F32,
        }
    }

    /// Create a new f16 tensor from data and a shape.
    ///
    /// # Panics
    /// Panics if `data.len() != shape.numel()`.
    pub fn new_f16(data: Vec<f16>, shape: Shape) -> Self {
        assert_eq!(
            data.len(),
            shape.numel(),
            "data length {} does not match shape {} (numel={})",
            data.len(),
            shape,
            shape.numel()
        );
        Tensor {
            storage: CpuStorage::from_f16_vec(data),
            shape,
            dtype: DType::F16,
        }
    }

    /// Create a zero-filled tensor with the given dtype and shape.
    ///
    /// # Errors
    /// Returns `TensorError::Allocation` if the storage cannot be allocated.
    pub fn zeros(dtype: DType, shape: Shape) -> Result<Self> {
        let storage = CpuStorage::zeros(dtype, shape.numel())?;
        Ok(Tensor {
            storage,
            shape,
            dtype,
        })
    }

    /// Returns a reference to the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the tensor's data type.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Returns the underlying data as an f32 slice.
    ///
    /// # Errors
    /// Returns an error if the storage is not F32.
    pub fn data_f32(&self) -> Result<&[f32]> {
        self.storage.as_f32_slice()
    }

    /// Write a single f32 value at a flat row-major offset.
    ///
    /// # Errors
    /// Returns an error if the storage is not F32 or the offset is out of
    /// bounds.
    pub fn set_f32(&mut self, offset: usize, value: f32) -> Result<()> {
        let len = self.storage.len();
        let slice = self.storage.as_f32_slice_mut()?;
        let slot = slice
            .get_mut(offset)
            .ok_or(TensorError::IndexOutOfBounds { index: offset, len })?;
        *slot = value;
        Ok(())
    }

    /// Copy `len` elements starting at flat offset `start` into an owned
    /// f32 vector, widening F16 storage on read.
    pub fn gather_f32(&self, start: usize, len: usize) -> Result<Vec<f32>> {
        self.storage.gather_f32(start, len)
    }

    /// Returns the underlying storage reference.
    pub fn storage(&self) -> &CpuStorage {
        &self.storage
    }
}
