//! Write interface of a statement store

use crate::{Graph, Quad};

/// A store that accepts statements
///
/// Parsers only ever add; reading back is the store's own business.
pub trait QuadStore {
    /// Add one statement
    fn add(&mut self, quad: Quad);
}

impl QuadStore for Graph {
    fn add(&mut self, quad: Quad) {
        self.push(quad);
    }
}

impl QuadStore for Vec<Quad> {
    fn add(&mut self, quad: Quad) {
        self.push(quad);
    }
}

impl<S: QuadStore + ?Sized> QuadStore for &mut S {
    fn add(&mut self, quad: Quad) {
        (**self).add(quad);
    }
}
