use std::ops::{Deref, DerefMut};

use super::Triangulation;

/// Receives notice of structural changes to a triangulation.
///
/// Within any batch of nested [`ChangeSpan`]s exactly one `to_be_changed`
/// and one `was_changed` call is made, on the outermost span.
pub trait ChangeObserver: Send + Sync {
    fn to_be_changed(&self);
    fn was_changed(&self);
}

/// Brackets a batch of mutations on a triangulation.
///
/// Every mutating method of [`Triangulation`] opens its own span, so a
/// caller that wants several mutations reported as one change opens an
/// outer span and mutates through it.
pub struct ChangeSpan<'a, const N: usize> {
    tri: &'a mut Triangulation<N>,
}

impl<'a, const N: usize> ChangeSpan<'a, N> {
    pub fn new(tri: &'a mut Triangulation<N>) -> Self {
        if tri.span_depth == 0 {
            if let Some(observer) = &tri.observer {
                observer.to_be_changed();
            }
        }
        tri.span_depth += 1;
        Self { tri }
    }
}

impl<const N: usize> Deref for ChangeSpan<'_, N> {
    type Target = Triangulation<N>;

    fn deref(&self) -> &Self::Target {
        self.tri
    }
}

impl<const N: usize> DerefMut for ChangeSpan<'_, N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.tri
    }
}

impl<const N: usize> Drop for ChangeSpan<'_, N> {
    fn drop(&mut self) {
        self.tri.span_depth -= 1;
        if self.tri.span_depth == 0 {
            if let Some(observer) = &self.tri.observer {
                observer.was_changed();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::core::perm::Perm4;
    use crate::core::triangulation::Triangulation3;

    #[derive(Default)]
    struct Counter {
        before: AtomicUsize,
        after: AtomicUsize,
    }

    impl ChangeObserver for Counter {
        fn to_be_changed(&self) {
            self.before.fetch_add(1, Ordering::SeqCst);
        }
        fn was_changed(&self) {
            self.after.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn nested_spans_fire_once() {
        let counter = Arc::new(Counter::default());
        let mut tri = Triangulation3::new();
        tri.set_observer(Some(counter.clone()));
        {
            let mut span = tri.change();
            let a = span.new_simplex();
            let b = span.new_simplex();
            span.join(a, 0, b, Perm4::identity()).unwrap();
            span.join(a, 1, b, Perm4::identity()).unwrap();
            assert_eq!(counter.after.load(Ordering::SeqCst), 0);
        }
        assert_eq!(counter.before.load(Ordering::SeqCst), 1);
        assert_eq!(counter.after.load(Ordering::SeqCst), 1);

        tri.unjoin(0.into(), 0).unwrap();
        assert_eq!(counter.before.load(Ordering::SeqCst), 2);
        assert_eq!(counter.after.load(Ordering::SeqCst), 2);
    }
}
