//! Demo trees the viewer can load.

use nest_core::{Colour, Shape};
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scene {
    Dog,
    Fan,
    Random,
}

impl Scene {
    pub const ALL: [Scene; 3] = [Scene::Dog, Scene::Fan, Scene::Random];

    pub fn label(self) -> &'static str {
        match self {
            Scene::Dog => "Dog",
            Scene::Fan => "Four-leaf fan",
            Scene::Random => "Random",
        }
    }

    pub fn shape(self, rng: &mut impl Rng) -> Shape {
        match self {
            Scene::Dog => dog(),
            Scene::Fan => Shape::repeat(&Shape::leaf(), 4),
            Scene::Random => Shape::random(rng, 3, 5),
        }
    }
}

/// Head, body and tail; the body carries four legs of foot, calf, knee
/// and thigh.
pub fn dog() -> Shape {
    let leg = Shape::repeat(&Shape::leaf(), 4).with_colour(Colour::new(210, 180, 140));
    let legs = Shape::repeat(&leg, 4);
    let body = Shape::group([legs, Shape::leaf(), Shape::leaf()]);

    let eyes = Shape::repeat(&Shape::leaf(), 2).with_colour(Colour::new(120, 170, 255));
    let ears = Shape::repeat(&Shape::leaf(), 2);
    let head = Shape::group([ears, eyes, Shape::leaf(), Shape::leaf()]);

    let tail = Shape::leaf();
    Shape::group([head, body, tail])
}
