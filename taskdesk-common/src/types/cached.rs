pub trait Cacheable<C>
where
    Self: Sized,
{
    fn cached(self, cache: C) -> Cached<Self, C>;
}

impl<T, C> Cacheable<C> for T {
    fn cached(self, cache: C) -> Cached<Self, C> {
        Cached::new(self, cache)
    }
}

/// A wrapper pairing an inner client with the cache it reads through.
pub struct Cached<T, C> {
    pub inner: T,
    pub cache: C,
}

impl<T, C> Cached<T, C> {
    pub fn new(inner: T, cache: C) -> Self {
        Self { inner, cache }
    }
}
