//! Capability contracts a plugin may implement.
//!
//! Each verb is its own single-method trait so a plugin only implements the
//! verbs it supports. One value implementing several verbs is registered
//! through a shared handle (`&T`, `Rc<T>`, `Arc<T>`); the wrapper impls below
//! forward to the inner value.

use crate::models::{CheckRequest, GetRequest, PutRequest, Response};
use anyhow::Result;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

/// Discovers versions of the external resource.
pub trait Checker<S, V> {
    /// Return versions in chronological order, oldest first. An empty list
    /// means nothing new was found.
    fn check(&self, request: CheckRequest<S, V>) -> Result<Vec<V>>;
}

/// Materializes a specific version into `target_dir`.
pub trait Getter<S, V, G> {
    fn get(&self, target_dir: &Path, request: GetRequest<S, V, G>) -> Result<Response<V>>;
}

/// Publishes a new version built from the contents of `source_dir`.
pub trait Putter<S, V, P> {
    fn put(&self, source_dir: &Path, request: PutRequest<S, P>) -> Result<Response<V>>;
}

macro_rules! forward_capabilities {
    ($($wrapper:ty),+ $(,)?) => {
        $(
            impl<S, V, T: Checker<S, V> + ?Sized> Checker<S, V> for $wrapper {
                fn check(&self, request: CheckRequest<S, V>) -> Result<Vec<V>> {
                    (**self).check(request)
                }
            }

            impl<S, V, G, T: Getter<S, V, G> + ?Sized> Getter<S, V, G> for $wrapper {
                fn get(
                    &self,
                    target_dir: &Path,
                    request: GetRequest<S, V, G>,
                ) -> Result<Response<V>> {
                    (**self).get(target_dir, request)
                }
            }

            impl<S, V, P, T: Putter<S, V, P> + ?Sized> Putter<S, V, P> for $wrapper {
                fn put(
                    &self,
                    source_dir: &Path,
                    request: PutRequest<S, P>,
                ) -> Result<Response<V>> {
                    (**self).put(source_dir, request)
                }
            }
        )+
    };
}

forward_capabilities!(&T, Box<T>, Rc<T>, Arc<T>);
