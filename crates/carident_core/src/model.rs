//! Model boundary traits and the process-wide model cache.
//!
//! The pipeline treats the network as a black box behind [`CariesModel`];
//! saliency additionally needs read access to the layer graph through
//! [`InspectableModel`]. No other introspection is required.

use std::sync::{Arc, Mutex, OnceLock};

use burn::prelude::*;
use burn::tensor::TensorData;

use crate::error::Result;

/// Black-box inference boundary.
///
/// Implementations are expected to be stateless with respect to their
/// weights, so a single instance can be shared read-only across concurrent
/// requests; each request owns its input and output tensors.
pub trait CariesModel<B: Backend> {
    /// Declared input size as `(height, width)`. Preprocessing resizes to
    /// this before inference.
    fn input_size(&self) -> (usize, usize);

    /// Run inference on a preprocessed NHWC batch of one.
    ///
    /// The returned data keeps whatever shape the network produces; shape
    /// dispatch happens in [`crate::normalize`].
    fn predict(&self, input: Tensor<B, 4>) -> Result<TensorData>;
}

/// Read access to the model's layer graph for gradient-based attribution.
pub trait InspectableModel<B: Backend>: CariesModel<B> {
    /// Layer names in forward order (input side first).
    fn layer_names(&self) -> Vec<String>;

    /// Feature maps of `layer` for `input`, and the gradients of the mean
    /// output activation with respect to those feature maps. Both NHWC.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::ModelUnavailable`] when the layer does
    /// not exist or gradients cannot be computed.
    fn layer_gradients(
        &self,
        input: Tensor<B, 4>,
        layer: &str,
    ) -> Result<(Tensor<B, 4>, Tensor<B, 4>)>;

    /// Gradient of the mean output activation with respect to `input`.
    fn input_gradients(&self, input: Tensor<B, 4>) -> Result<Tensor<B, 4>>;
}

/// Process-wide, lazily initialized model handle.
///
/// The model is loaded at most once per process; after construction the
/// handle is immutable and shared. Concurrent [`ModelCache::acquire`] calls
/// are idempotent: losers of the initialization race get the winner's
/// instance, never a second load.
pub struct ModelCache<M> {
    slot: OnceLock<Arc<M>>,
    init: Mutex<()>,
}

impl<M> ModelCache<M> {
    /// Create an empty cache. Usable in `static` position.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// The cached model, if one has been loaded.
    #[must_use]
    pub fn get(&self) -> Option<Arc<M>> {
        self.slot.get().cloned()
    }

    /// Return the cached model, loading it with `load` on first use.
    ///
    /// A failed load leaves the cache empty so a later call can retry.
    ///
    /// # Errors
    ///
    /// Propagates the loader's error.
    pub fn acquire<F>(&self, load: F) -> Result<Arc<M>>
    where
        F: FnOnce() -> Result<M>,
    {
        if let Some(model) = self.slot.get() {
            return Ok(model.clone());
        }
        let _guard = self.init.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(model) = self.slot.get() {
            return Ok(model.clone());
        }
        let model = Arc::new(load()?);
        let _ = self.slot.set(model.clone());
        tracing::info!("model loaded into process-wide cache");
        Ok(model)
    }
}

impl<M> Default for ModelCache<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_acquire_loads_once() {
        let cache: ModelCache<String> = ModelCache::new();
        let loads = AtomicUsize::new(0);

        let first = cache
            .acquire(|| {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok("model".to_string())
            })
            .unwrap();
        let second = cache
            .acquire(|| {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok("other".to_string())
            })
            .unwrap();

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second, "model");
    }

    #[test]
    fn test_failed_load_can_retry() {
        let cache: ModelCache<u32> = ModelCache::new();
        let err = cache
            .acquire(|| Err(CoreError::ModelUnavailable("weights missing".into())))
            .unwrap_err();
        assert!(err.to_string().contains("weights missing"));
        assert!(cache.get().is_none());

        let model = cache.acquire(|| Ok(7)).unwrap();
        assert_eq!(*model, 7);
    }

    #[test]
    fn test_concurrent_acquire_is_idempotent() {
        let cache: Arc<ModelCache<u32>> = Arc::new(ModelCache::new());
        let loads = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let loads = loads.clone();
                std::thread::spawn(move || {
                    cache
                        .acquire(|| {
                            loads.fetch_add(1, Ordering::SeqCst);
                            Ok(11)
                        })
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(*handle.join().unwrap(), 11);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }
}
