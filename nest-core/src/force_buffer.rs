use crate::types::NodeId;
use glam::DVec2;

/// Per-node velocity accumulator for one solver step.
///
/// The gathering and repulsion phases only ever add into the slot of the
/// node they are pushing, while reading positions from the tree. The
/// integration phase is the single consumer: it applies every slot and
/// clears the buffer, so no phase ever sees a half-updated step.
///
/// Internally, `velocity[i]` corresponds to node `i`.
#[derive(Debug, Clone)]
pub struct ForceBuffer {
    velocity: Vec<DVec2>,
}

impl ForceBuffer {
    /// Creates a buffer for `len` nodes with every velocity at zero.
    pub fn with_len(len: usize) -> Self {
        Self {
            velocity: vec![DVec2::ZERO; len],
        }
    }

    pub fn len(&self) -> usize {
        self.velocity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.velocity.is_empty()
    }

    /// Resizes to `len` slots and clears every slot, even if the length was
    /// already correct.
    pub fn ensure_len(&mut self, len: usize) {
        if self.velocity.len() != len {
            self.velocity.resize(len, DVec2::ZERO);
        }
        self.clear();
    }

    pub fn clear(&mut self) {
        for v in &mut self.velocity {
            *v = DVec2::ZERO;
        }
    }

    /// Adds `dv` to the velocity of `id`.
    ///
    /// ### Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn add(&mut self, id: NodeId, dv: DVec2) {
        self.velocity[id] += dv;
    }

    /// Velocity accumulated so far for `id`; zero for unknown ids.
    #[inline]
    pub fn velocity(&self, id: NodeId) -> DVec2 {
        self.velocity.get(id).copied().unwrap_or(DVec2::ZERO)
    }

    /// Sum of squared velocity magnitudes over every node.
    pub fn kinetic_energy(&self) -> f64 {
        self.velocity.iter().map(|v| v.length_squared()).sum()
    }

    /// First node whose velocity is NaN or infinite, if any.
    pub fn first_non_finite(&self) -> Option<(NodeId, DVec2)> {
        self.velocity
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
            .map(|(id, &v)| (id, v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, DVec2)> + '_ {
        self.velocity.iter().copied().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_len_initializes_zeroed_state() {
        let buf = ForceBuffer::with_len(5);
        assert_eq!(buf.len(), 5);
        assert!(buf.iter().all(|(_, v)| v == DVec2::ZERO));
        assert_eq!(buf.kinetic_energy(), 0.0);
    }

    #[test]
    fn ensure_len_resizes_and_clears() {
        let mut buf = ForceBuffer::with_len(2);
        buf.add(1, DVec2::new(1.0, 2.0));

        buf.ensure_len(2);
        assert_eq!(buf.velocity(1), DVec2::ZERO);

        buf.add(0, DVec2::X);
        buf.ensure_len(4);
        assert_eq!(buf.len(), 4);
        assert!(buf.iter().all(|(_, v)| v == DVec2::ZERO));

        buf.ensure_len(0);
        assert!(buf.is_empty());
    }

    #[test]
    fn add_accumulates_and_energy_sums_squares() {
        let mut buf = ForceBuffer::with_len(3);
        buf.add(0, DVec2::new(1.0, 0.0));
        buf.add(0, DVec2::new(2.0, 0.0));
        buf.add(2, DVec2::new(0.0, -4.0));

        assert_eq!(buf.velocity(0), DVec2::new(3.0, 0.0));
        assert_eq!(buf.velocity(1), DVec2::ZERO);
        assert_eq!(buf.kinetic_energy(), 9.0 + 16.0);
        assert_eq!(buf.velocity(99), DVec2::ZERO);

        buf.clear();
        assert_eq!(buf.kinetic_energy(), 0.0);
    }

    #[test]
    fn first_non_finite_finds_blown_up_slot() {
        let mut buf = ForceBuffer::with_len(3);
        assert_eq!(buf.first_non_finite(), None);

        buf.add(1, DVec2::new(f64::INFINITY, 0.0));
        let (id, v) = buf.first_non_finite().unwrap();
        assert_eq!(id, 1);
        assert!(v.x.is_infinite());
    }

    #[test]
    #[should_panic]
    fn add_panics_out_of_bounds() {
        let mut buf = ForceBuffer::with_len(1);
        buf.add(1, DVec2::X);
    }
}
