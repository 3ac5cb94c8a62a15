//! The simulation context and the loop that drives it to rest.

use tracing::{info, trace, warn};

use crate::{
    config::LayoutConfig,
    error::{LayoutError, LayoutResult},
    force_buffer::ForceBuffer,
    partition::spread,
    phases,
    render::{Canvas, StopSignal, draw_frame},
    tree::{Ancestry, Tree},
    types::{Circle, Colour, NodeId},
};

/// Why an arrangement loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A step's energy dropped to `min_energy` or below.
    Converged,
    /// `max_iterations` steps ran without converging.
    IterationLimit,
    /// The stop signal fired between steps.
    Stopped,
}

/// Summary of one [`Layout::arrange`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arrangement {
    pub outcome: Outcome,
    /// Steps taken by this call.
    pub iterations: usize,
    /// Energy of the last step, `None` if no step ran.
    pub energy: Option<f64>,
}

/// Everything one layout run needs: the tree, its lineage table, the
/// tuning constants and the velocity buffer.
///
/// The tree is frozen once it is handed over; only weights and colours may
/// change afterwards, through [`Layout::set_weight`] and
/// [`Layout::set_colour`].
#[derive(Debug, Clone)]
pub struct Layout {
    tree: Tree,
    ancestry: Ancestry,
    cfg: LayoutConfig,
    acc: ForceBuffer,
    root: NodeId,
    iterations: usize,
    last_energy: Option<f64>,
}

impl Layout {
    /// Lays out `tree` around its most recently built top-level node.
    pub fn new(tree: Tree, cfg: LayoutConfig) -> LayoutResult<Self> {
        let root = tree.root().ok_or(LayoutError::EmptyTree)?;
        Self::with_root(tree, root, cfg)
    }

    /// Lays out `tree` around `root`.
    ///
    /// ### Errors
    /// - [`LayoutError::Config`] if `cfg` fails validation.
    /// - [`LayoutError::UnknownNode`] if `root` is not in `tree`.
    /// - [`LayoutError::DetachedNodes`] unless every node in the arena
    ///   descends from `root`. An inner node, or one tree of a forest, would
    ///   leave the rest unplaced and every step would fail.
    pub fn with_root(tree: Tree, root: NodeId, cfg: LayoutConfig) -> LayoutResult<Self> {
        cfg.validate()?;
        let reachable = tree.subtree(root)?.len();
        if reachable != tree.len() {
            return Err(LayoutError::DetachedNodes {
                root,
                reachable,
                total: tree.len(),
            });
        }
        let ancestry = Ancestry::build(&tree);
        let acc = ForceBuffer::with_len(tree.len());
        Ok(Self {
            tree,
            ancestry,
            cfg,
            acc,
            root,
            iterations: 0,
            last_energy: None,
        })
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.cfg
    }

    /// Total steps taken since the last spread.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Energy returned by the latest step.
    pub fn energy(&self) -> Option<f64> {
        self.last_energy
    }

    pub fn is_converged(&self) -> bool {
        self.last_energy.is_some_and(|e| e <= self.cfg.min_energy)
    }

    pub fn set_weight(&mut self, id: NodeId, weight: f64) -> LayoutResult<()> {
        self.tree.set_weight(id, weight)
    }

    pub fn set_colour(&mut self, id: NodeId, colour: Colour) -> LayoutResult<()> {
        self.tree.set_colour(id, colour)
    }

    /// Gives the root `region` and every descendant its starting placement,
    /// discarding any progress made by earlier steps.
    pub fn spread(&mut self, region: Circle) -> LayoutResult<()> {
        spread(&mut self.tree, self.root, region, &self.cfg)?;
        self.acc.ensure_len(self.tree.len());
        self.iterations = 0;
        self.last_energy = None;
        Ok(())
    }

    /// Runs one solver step and returns its kinetic energy.
    ///
    /// The tree must have been [spread](Layout::spread) first; otherwise this
    /// fails with [`LayoutError::UnlaidOutNode`] and nothing moves.
    pub fn step(&mut self) -> LayoutResult<f64> {
        let result = self.try_step();
        if result.is_err() {
            self.acc.clear();
        }
        let energy = result?;

        self.iterations += 1;
        self.last_energy = Some(energy);
        trace!(iteration = self.iterations, energy, "step");
        Ok(energy)
    }

    fn try_step(&mut self) -> LayoutResult<f64> {
        phases::gathering_phase(&self.tree, self.root, &self.cfg, &mut self.acc)?;
        phases::repulsion_phase(&self.tree, &self.ancestry, &self.cfg, &mut self.acc)?;
        phases::integration_phase(&mut self.tree, &mut self.acc)
    }

    /// Steps lazily, yielding each step's energy.
    ///
    /// The iterator ends after yielding an energy at or below `min_energy`,
    /// after `max_iterations` items, or after yielding the first error.
    pub fn steps(&mut self) -> Steps<'_> {
        Steps {
            layout: self,
            taken: 0,
            done: false,
        }
    }

    /// Spreads the tree into `region`, then steps until it comes to rest.
    ///
    /// `stop` is polled before every step. With a `canvas`, every step is
    /// followed by a full frame: clear, draw the tree, present.
    ///
    /// ### Returns
    /// An [`Arrangement`] saying how the loop ended. Hitting the iteration
    /// cap or a stop request is not an error; the layout keeps whatever
    /// progress it made.
    ///
    /// ### Errors
    /// Anything [`Layout::spread`], [`Layout::step`] or drawing can fail with.
    pub fn arrange(
        &mut self,
        region: Circle,
        mut canvas: Option<&mut dyn Canvas>,
        stop: &mut dyn StopSignal,
    ) -> LayoutResult<Arrangement> {
        self.spread(region)?;

        let mut energy = None;
        let mut iterations = 0;
        let outcome = loop {
            if iterations >= self.cfg.max_iterations {
                warn!(
                    iterations,
                    energy, "layout did not converge within the iteration limit"
                );
                break Outcome::IterationLimit;
            }
            if stop.stop_requested() {
                info!(iterations, "layout stopped on request");
                break Outcome::Stopped;
            }

            let e = self.step()?;
            iterations += 1;
            energy = Some(e);

            if let Some(canvas) = canvas.as_deref_mut() {
                self.draw(canvas)?;
            }
            if e <= self.cfg.min_energy {
                info!(iterations, energy = e, "layout converged");
                break Outcome::Converged;
            }
        };

        Ok(Arrangement {
            outcome,
            iterations,
            energy,
        })
    }

    /// Draws one full frame of the current state.
    pub fn draw(&self, canvas: &mut dyn Canvas) -> LayoutResult<()> {
        draw_frame(&self.tree, self.root, self.cfg.background, canvas)
    }
}

/// Iterator returned by [`Layout::steps`].
pub struct Steps<'a> {
    layout: &'a mut Layout,
    taken: usize,
    done: bool,
}

impl Iterator for Steps<'_> {
    type Item = LayoutResult<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.taken >= self.layout.cfg.max_iterations {
            return None;
        }
        self.taken += 1;
        let result = self.layout.step();
        self.done = match &result {
            Ok(energy) => *energy <= self.layout.cfg.min_energy,
            Err(_) => true,
        };
        Some(result)
    }
}
