pub mod memory;

use std::error::Error;
use std::future::Future;
use std::hash::Hash;

/// An asynchronous key/value store.
///
/// The session marker is kept behind this trait so that the same session logic
/// works with an in-memory store in tests and a file on disk in applications.
#[trait_variant::make(Send)]
pub trait Store<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    type Error: Error;

    fn get(&self, key: &K) -> impl Future<Output = Result<Option<V>, Self::Error>>;
    fn set(&self, key: K, value: V) -> impl Future<Output = Result<(), Self::Error>>;
    fn del(&self, key: &K) -> impl Future<Output = Result<(), Self::Error>>;
    fn clear(&self) -> impl Future<Output = Result<(), Self::Error>>;
}
