//! Address to coordinate lookup.
//!
//! A fixed table of known addresses answers first; anything else goes to an
//! inner geocoder (OpenRouteService with feature `ors`) whose hits are kept in
//! an LRU cache. Failures are logged and reported as "not found".

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use crate::geo::GeoPoint;

/// Fallback answers kept by [`CachedLookupGeocoder`].
pub const GEOCODE_CACHE_CAPACITY: usize = 1_000;

#[cfg(feature = "ors")]
pub use crate::routing::ors::OrsGeocoder;

/// Resolves a free-form address to a point.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str) -> Option<GeoPoint>;
}

/// Addresses with fixed coordinates, matched exactly.
#[derive(Debug, Clone, Default)]
pub struct KnownAddresses {
    entries: HashMap<String, GeoPoint>,
}

impl KnownAddresses {
    /// The delivery addresses used around Campinas.
    pub fn campinas() -> Self {
        let seed = [
            (
                "Rua Dr. Salles de Oliveira, 1380, Vila Industrial, Campinas, SP",
                GeoPoint::new(-22.91506, -47.08155),
            ),
            (
                "Avenida da Amizade, 2300, Vila Carlota, Sumaré, SP",
                GeoPoint::new(-22.81308, -47.25197),
            ),
            (
                "Rua Luiz Camilo de Camargo, 585, Centro, Hortolândia, SP",
                GeoPoint::new(-22.8596, -47.22013),
            ),
            (
                "Av. Iguatemi, 777, Vila Brandina, Campinas, SP",
                GeoPoint::new(-22.89531, -47.02115),
            ),
            (
                "Rua Antônio de Castro, 123, Sousas, Campinas, SP",
                GeoPoint::new(-22.88045, -46.96695),
            ),
            (
                "Avenida Olivo Callegari, 789, Centro, Sumaré, SP",
                GeoPoint::new(-22.82223, -47.27137),
            ),
            (
                "Rua Sete de Setembro, 50, Centro, Valinhos, SP",
                GeoPoint::new(-22.97126, -46.99616),
            ),
            (
                "Avenida Francisco Glicério, 1000, Centro, Campinas, SP",
                GeoPoint::new(-22.90565, -47.05837),
            ),
            (
                "Rua Rosina Zagatti, 204, Jardim Amanda II, Hortolândia, SP",
                GeoPoint::new(-22.89426, -47.2346),
            ),
            (
                "Avenida John Boyd Dunlop, 3900, Jardim Ipaussurama, Campinas, SP",
                GeoPoint::new(-22.9234, -47.11211),
            ),
        ];
        let mut known = Self::default();
        for (address, point) in seed {
            known.insert(address, point);
        }
        known
    }

    pub fn insert(&mut self, address: impl Into<String>, point: GeoPoint) {
        self.entries.insert(address.into(), point);
    }

    pub fn lookup(&self, address: &str) -> Option<GeoPoint> {
        self.entries.get(address).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Geocoder for KnownAddresses {
    fn geocode(&self, address: &str) -> Option<GeoPoint> {
        self.lookup(address)
    }
}

/// Known addresses first, then the cache of earlier fallback answers, then
/// the fallback geocoder itself. Only successful lookups are cached; misses
/// are retried on the next request.
pub struct CachedLookupGeocoder {
    known: KnownAddresses,
    fallback: Option<Box<dyn Geocoder>>,
    cache: Mutex<LruCache<String, GeoPoint>>,
}

impl CachedLookupGeocoder {
    pub fn new(known: KnownAddresses, fallback: Option<Box<dyn Geocoder>>) -> Self {
        Self::with_cache_capacity(known, fallback, GEOCODE_CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(
        known: KnownAddresses,
        fallback: Option<Box<dyn Geocoder>>,
        capacity: usize,
    ) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            known,
            fallback,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn known(&self) -> &KnownAddresses {
        &self.known
    }

    /// Number of fallback answers currently cached.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    fn cached(&self, address: &str) -> Option<GeoPoint> {
        // A poisoned cache is bypassed, not fatal.
        self.cache.lock().ok()?.get(address).copied()
    }

    fn remember(&self, address: &str, point: GeoPoint) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(address.to_string(), point);
        }
    }
}

impl Geocoder for CachedLookupGeocoder {
    fn geocode(&self, address: &str) -> Option<GeoPoint> {
        if let Some(point) = self.known.lookup(address) {
            log::debug!("[geocoding] '{address}' resolved from known addresses");
            return Some(point);
        }
        if let Some(point) = self.cached(address) {
            log::debug!("[geocoding] '{address}' resolved from cache");
            return Some(point);
        }
        let Some(fallback) = &self.fallback else {
            log::warn!("[geocoding] unknown address '{address}' and no fallback geocoder");
            return None;
        };
        let point = fallback.geocode(address)?;
        self.remember(address, point);
        Some(point)
    }
}
