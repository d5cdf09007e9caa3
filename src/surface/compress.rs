//! Compressing discs and incompressibility.
//!
//! A surface is tested for incompressibility by cutting along it and
//! looking for a compressing disc on either side. The two sides are
//! searched independently, in parallel when configured to, and the first
//! side to find a disc stops the other. Finding candidate discs (normal
//! surface enumeration) is left to the [`DiscSearcher`] in use.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use num_bigint::BigInt;
use rayon::prelude::*;

use crate::core::shared::ConfigType;
use crate::core::triangulation::Triangulation3;

use super::{Err, NormalSurface, TetCoords};

#[derive(Clone, Debug)]
pub struct Config {
    /// Worker threads for the two sides. Anything below 2 searches the
    /// sides one after the other.
    pub threads: usize,
    /// The most candidate discs a searcher examines on one side.
    pub max_candidates: usize,
}

impl ConfigType for Config {
    fn default() -> Self {
        Self { threads: 2, max_candidates: 1 << 16 }
    }
}

/// Shared state through which searches stop one another.
///
/// Searchers check [`SearchControl::should_stop`] between steps and return
/// [`Err::Cancelled`] once it is set.
#[derive(Debug, Default)]
pub struct SearchControl {
    found: AtomicBool,
    cancelled: AtomicBool,
}

impl SearchControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks every search using this control to stop.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Records that one side holds a compressing disc.
    pub fn mark_found(&self) {
        self.found.store(true, Ordering::SeqCst);
    }

    pub fn has_found(&self) -> bool {
        self.found.load(Ordering::SeqCst)
    }

    fn clear_found(&self) {
        self.found.store(false, Ordering::SeqCst);
    }

    pub fn should_stop(&self) -> bool {
        self.has_found() || self.is_cancelled()
    }
}

/// Looks for a compressing disc in one side of a cut-open surface.
pub trait DiscSearcher: Sync {
    /// Returns whether `side`, a connected triangulation with boundary,
    /// holds a compressing disc for its boundary.
    fn search(&self, side: &Triangulation3, cfg: &Config, control: &SearchControl) -> Result<bool, Err>;
}

type CandidateFn = dyn Fn(&Triangulation3) -> Vec<Vec<TetCoords>> + Send + Sync;

/// Tests disc candidates produced by an external enumerator, keeping the
/// first that is a genuine compressing disc.
#[derive(Clone)]
pub struct CandidateSearcher {
    candidates: Arc<CandidateFn>,
}

impl CandidateSearcher {
    pub fn new(candidates: impl Fn(&Triangulation3) -> Vec<Vec<TetCoords>> + Send + Sync + 'static) -> Self {
        Self { candidates: Arc::new(candidates) }
    }
}

impl std::fmt::Debug for CandidateSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateSearcher").finish_non_exhaustive()
    }
}

impl DiscSearcher for CandidateSearcher {
    fn search(&self, side: &Triangulation3, cfg: &Config, control: &SearchControl) -> Result<bool, Err> {
        let side = Arc::new(side.clone());
        for (i, coords) in (self.candidates)(side.as_ref()).into_iter().take(cfg.max_candidates).enumerate() {
            if control.should_stop() {
                return Err(Err::Cancelled);
            }
            let disc = match NormalSurface::new(side.clone(), coords) {
                Ok(disc) => disc,
                Err(e) => {
                    tracing::debug!(candidate = i, error = %e, "skipping candidate");
                    continue;
                }
            };
            if disc.is_compressing_disc()? {
                tracing::debug!(candidate = i, "found compressing disc");
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// A surface cut open, with its sides ready to be searched.
#[derive(Debug)]
pub struct CompressingDiscSearch {
    sides: Vec<Triangulation3>,
    control: Arc<SearchControl>,
}

impl CompressingDiscSearch {
    /// Cuts along the surface and keeps the pieces that have boundary.
    pub fn new(surface: &NormalSurface) -> Result<Self, Err> {
        let cut = surface.cut_along()?;
        let sides: Vec<_> = cut.triangulate_components().into_iter().filter(|c| c.has_boundary_facets()).collect();
        tracing::debug!(sides = sides.len(), size = cut.size(), "cut open for disc search");
        Ok(Self { sides, control: Arc::new(SearchControl::new()) })
    }

    pub fn sides(&self) -> &[Triangulation3] {
        &self.sides
    }

    /// The control shared by both searches, for cancelling from outside.
    pub fn control(&self) -> Arc<SearchControl> {
        self.control.clone()
    }

    /// Returns whether either side holds a compressing disc.
    ///
    /// Every run starts with nothing found, but a cancellation made through
    /// [`CompressingDiscSearch::control`] stays in force for later runs.
    pub fn run<S: DiscSearcher>(&self, searcher: &S, cfg: &Config) -> Result<bool, Err> {
        let control = &*self.control;
        control.clear_found();
        let search = |side: &Triangulation3| search_side(searcher, side, cfg, control);
        let results: Vec<Result<bool, Err>> = match self.pool(cfg) {
            Some(pool) => pool.install(|| self.sides.par_iter().map(search).collect()),
            None => self.sides.iter().map(search).collect(),
        };

        if control.has_found() {
            return Ok(true);
        }
        if control.is_cancelled() {
            return Err(Err::Cancelled);
        }
        for r in results {
            r?;
        }
        Ok(false)
    }

    /// A pool with one worker per side, or `None` to search in turn.
    fn pool(&self, cfg: &Config) -> Option<rayon::ThreadPool> {
        if cfg.threads < 2 || self.sides.len() < 2 {
            return None;
        }
        let threads = cfg.threads.min(self.sides.len());
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => Some(pool),
            Err(e) => {
                tracing::warn!(error = %e, "could not start search threads, searching sides in turn");
                None
            }
        }
    }
}

fn search_side<S: DiscSearcher>(searcher: &S, side: &Triangulation3, cfg: &Config, control: &SearchControl) -> Result<bool, Err> {
    if control.should_stop() {
        return Ok(false);
    }
    match searcher.search(side, cfg, control) {
        Ok(true) => {
            control.mark_found();
            Ok(true)
        }
        Err(Err::Cancelled) if control.has_found() => Ok(false),
        other => other,
    }
}

impl NormalSurface {
    /// Whether this is a disc whose boundary does not bound a disc in the
    /// boundary of the triangulation.
    ///
    /// Cutting along a compressing disc either keeps the number of boundary
    /// components or splits one off without creating a new sphere.
    pub fn is_compressing_disc(&self) -> Result<bool, Err> {
        if !self.has_real_boundary() || self.euler_char()? != BigInt::from(1) || !self.is_connected()? {
            return Ok(false);
        }
        let spheres = |tri: &Triangulation3| tri.boundary_components().iter().filter(|b| b.euler_char() == 2).count();
        let before = spheres(&self.tri);
        let cut = self.cut_along()?;
        if cut.count_boundary_components() == self.tri.count_boundary_components() {
            return Ok(true);
        }
        Ok(spheres(&cut) == before)
    }

    /// Whether this closed surface is incompressible, according to the
    /// given disc searcher.
    ///
    /// Spheres, projective planes and thin edge links are never
    /// incompressible. The answer is only as complete as the searcher: with
    /// a [`CandidateSearcher`], `true` means none of its candidates compress.
    pub fn is_incompressible<S: DiscSearcher>(&self, searcher: &S, cfg: &Config) -> Result<bool, Err> {
        let chi = self.euler_char()?;
        if chi == BigInt::from(2) || (chi == BigInt::from(1) && !self.is_two_sided()?) {
            return Ok(false);
        }
        if self.is_thin_edge_link().0.is_some() {
            return Ok(false);
        }
        let search = CompressingDiscSearch::new(self)?;
        if search.sides().len() > 2 {
            tracing::warn!(sides = search.sides().len(), "cutting gave more than two pieces with boundary");
            return Ok(false);
        }
        Ok(!search.run(searcher, cfg)?)
    }
}
