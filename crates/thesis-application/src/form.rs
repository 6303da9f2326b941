//! Per-form submission state.

use std::future::Future;
use std::sync::Mutex;
use thesis_core::{Result, ThesisError};

#[derive(Debug, Default)]
struct Inner<T> {
    values: T,
    loading: bool,
}

/// Values of one form plus its in-flight flag.
///
/// A second submit while one is in flight is refused. Values are cleared
/// only when a submit succeeds.
#[derive(Debug, Default)]
pub struct FormState<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> FormState<T>
where
    T: Clone + Default,
{
    pub fn new(values: T) -> Self {
        Self {
            inner: Mutex::new(Inner {
                values,
                loading: false,
            }),
        }
    }

    pub fn values(&self) -> Result<T> {
        Ok(self.lock()?.values.clone())
    }

    pub fn set_values(&self, values: T) -> Result<()> {
        self.lock()?.values = values;
        Ok(())
    }

    pub fn is_loading(&self) -> Result<bool> {
        Ok(self.lock()?.loading)
    }

    /// Runs `action` on a copy of the current values.
    pub async fn submit<F, Fut, R>(&self, action: F) -> Result<R>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        let values = {
            let mut inner = self.lock()?;
            if inner.loading {
                return Err(ThesisError::validation(
                    "form",
                    "a submission is already in progress",
                ));
            }
            inner.loading = true;
            inner.values.clone()
        };

        let _loading = LoadingGuard { inner: &self.inner };
        let outcome = action(values).await;
        if outcome.is_ok() {
            self.lock()?.values = T::default();
        }
        outcome
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner<T>>> {
        self.inner
            .lock()
            .map_err(|_| ThesisError::internal("form state poisoned"))
    }
}

/// Clears the in-flight flag however the submit ends, including cancellation.
struct LoadingGuard<'a, T> {
    inner: &'a Mutex<Inner<T>>,
}

impl<T> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.loading = false;
        }
    }
}
