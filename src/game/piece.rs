use rand::Rng;
use rand::seq::SliceRandom;

use crate::SPAWN_Y;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Outer fill, inset highlight, inner shadow.
pub type ColorTriple = [Rgb; 3];

/// Occupancy mask indexed as `mask[x][y]`.
pub type Mask = [[bool; 4]; 4];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Box,
    Stick,
    Z,
    T,
    S,
    BackwardsL,
    L,
}

// Literals are written column by column: each inner array is one `x`.
const fn mask(cols: [[u8; 4]; 4]) -> Mask {
    let mut out = [[false; 4]; 4];
    let mut x = 0;
    while x < 4 {
        let mut y = 0;
        while y < 4 {
            out[x][y] = cols[x][y] == 1;
            y += 1;
        }
        x += 1;
    }
    out
}

const BOX: Mask = mask([[0, 0, 0, 0], [0, 1, 1, 0], [0, 1, 1, 0], [0, 0, 0, 0]]);
const STICK: Mask = mask([[0, 0, 0, 0], [0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0]]);
const Z: Mask = mask([[0, 0, 0, 0], [0, 1, 1, 0], [0, 0, 1, 1], [0, 0, 0, 0]]);
const T: Mask = mask([[0, 0, 0, 0], [0, 1, 1, 1], [0, 0, 1, 0], [0, 0, 0, 0]]);
const S: Mask = mask([[0, 0, 0, 0], [0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0]]);
const BACKWARDS_L: Mask = mask([[0, 0, 1, 0], [0, 0, 1, 0], [0, 1, 1, 0], [0, 0, 0, 0]]);
const L: Mask = mask([[0, 1, 0, 0], [0, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0]]);

impl Shape {
    pub const ALL: [Shape; 7] = [
        Shape::Box,
        Shape::Stick,
        Shape::Z,
        Shape::T,
        Shape::S,
        Shape::BackwardsL,
        Shape::L,
    ];

    pub fn mask(self) -> &'static Mask {
        match self {
            Shape::Box => &BOX,
            Shape::Stick => &STICK,
            Shape::Z => &Z,
            Shape::T => &T,
            Shape::S => &S,
            Shape::BackwardsL => &BACKWARDS_L,
            Shape::L => &L,
        }
    }

    pub fn colors(self) -> ColorTriple {
        match self {
            Shape::Box => [Rgb(59, 84, 165), Rgb(118, 137, 196), Rgb(79, 111, 182)],
            Shape::Stick => [Rgb(214, 30, 60), Rgb(241, 108, 107), Rgb(236, 42, 75)],
            Shape::Z => [Rgb(88, 178, 71), Rgb(150, 204, 110), Rgb(115, 191, 68)],
            Shape::T => [Rgb(62, 170, 212), Rgb(120, 205, 244), Rgb(54, 192, 240)],
            Shape::S => [Rgb(236, 94, 36), Rgb(234, 154, 84), Rgb(228, 126, 37)],
            Shape::BackwardsL => [Rgb(220, 159, 39), Rgb(246, 197, 100), Rgb(242, 181, 42)],
            Shape::L => [Rgb(158, 35, 126), Rgb(193, 111, 173), Rgb(179, 63, 151)],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    pub mask: Mask,
    pub colors: ColorTriple,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    pub fn new(shape: Shape, x: i32, y: i32) -> Self {
        Self {
            mask: *shape.mask(),
            colors: shape.colors(),
            x,
            y,
        }
    }

    /// Spawns `shape` centred above a board `board_width` cells wide.
    pub fn spawn(shape: Shape, board_width: usize) -> Self {
        let span = board_width as i32 - 4;
        let x = span.div_euclid(2).min(span).max(0);
        Self::new(shape, x, SPAWN_Y)
    }

    /// Mask-relative offsets of every occupied cell.
    pub fn offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..4).flat_map(move |x| {
            (0..4)
                .filter(move |&y| self.mask[x][y])
                .map(move |y| (x as i32, y as i32))
        })
    }

    /// Board coordinates of every occupied cell.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.offsets().map(|(dx, dy)| (self.x + dx, self.y + dy))
    }

    pub fn rotated(&self) -> Self {
        let mut next = self.clone();
        for x in 0..4 {
            for y in 0..4 {
                next.mask[x][y] = self.mask[3 - y][x];
            }
        }
        next
    }
}

pub fn random_shape<R: Rng>(rng: &mut R) -> Shape {
    *Shape::ALL.choose(rng).unwrap_or(&Shape::Stick)
}

pub fn random_colors<R: Rng>(rng: &mut R) -> ColorTriple {
    random_shape(rng).colors()
}
