//! Backend abstraction - Multi-backend support
//!
//! Supports both CUDA (GPU) and NdArray (CPU) backends with automatic selection.
//! The service only runs inference, so no autodiff backend is exposed.

// --------------------------------------------------------------------------------
// BACKEND SELECTION: CUDA (preferred) or NdArray (fallback)
// --------------------------------------------------------------------------------

#[cfg(feature = "cuda")]
pub type InferenceBackend = burn_cuda::Cuda;

#[cfg(all(not(feature = "cuda"), any(feature = "ndarray", feature = "cpu")))]
pub type InferenceBackend = burn_ndarray::NdArray;

#[cfg(all(not(feature = "cuda"), not(feature = "ndarray"), not(feature = "cpu")))]
compile_error!("At least one backend (cuda, ndarray, or cpu) must be enabled!");

/// Get the default device
pub fn default_device() -> <InferenceBackend as burn::tensor::backend::Backend>::Device {
    <InferenceBackend as burn::tensor::backend::Backend>::Device::default()
}

/// Get a human-readable name for the current backend
pub fn backend_name() -> &'static str {
    #[cfg(feature = "cuda")]
    {
        "CUDA (GPU)"
    }

    #[cfg(all(not(feature = "cuda"), any(feature = "ndarray", feature = "cpu")))]
    {
        "NdArray (CPU)"
    }
}
