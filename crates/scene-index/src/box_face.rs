//! The six faces of a box and their local-space descriptors.

use nalgebra::Vector3;

/// One of the six faces of a box.
///
/// Faces are named from the point of view of a viewer looking down +Z, so
/// `Front` faces -Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxFace {
    /// -Z
    Front,
    /// +Z
    Back,
    /// -X
    Left,
    /// +X
    Right,
    /// -Y
    Bottom,
    /// +Y
    Top,
}

impl BoxFace {
    /// All faces, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Front,
        Self::Back,
        Self::Left,
        Self::Right,
        Self::Bottom,
        Self::Top,
    ];

    /// Index of the local axis this face is perpendicular to (0 = X, 1 = Y, 2 = Z).
    #[inline]
    pub fn axis_index(self) -> usize {
        match self {
            Self::Left | Self::Right => 0,
            Self::Bottom | Self::Top => 1,
            Self::Front | Self::Back => 2,
        }
    }

    /// `1.0` if the face normal points along the positive axis, `-1.0` otherwise.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Self::Back | Self::Right | Self::Top => 1.0,
            Self::Front | Self::Left | Self::Bottom => -1.0,
        }
    }

    /// Outward unit normal in box-local space.
    pub fn local_normal(self) -> Vector3<f32> {
        let mut n = Vector3::zeros();
        n[self.axis_index()] = self.sign();
        n
    }

    /// The face on the other side of the box.
    pub fn opposite(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Top => Self::Bottom,
        }
    }

    /// Face perpendicular to `axis` on the side given by `positive`.
    pub fn from_axis(axis: usize, positive: bool) -> Self {
        match (axis, positive) {
            (0, false) => Self::Left,
            (0, true) => Self::Right,
            (1, false) => Self::Bottom,
            (1, true) => Self::Top,
            (_, false) => Self::Front,
            (_, true) => Self::Back,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normals_are_unit_and_axis_aligned() {
        for face in BoxFace::ALL {
            let n = face.local_normal();
            assert_eq!(n.norm(), 1.0, "{face:?} normal should be unit length");
            assert_eq!(n[face.axis_index()], face.sign());
        }
    }

    #[test]
    fn opposite_faces_share_axis() {
        for face in BoxFace::ALL {
            let opposite = face.opposite();
            assert_ne!(face, opposite);
            assert_eq!(face.axis_index(), opposite.axis_index());
            assert_eq!(face.local_normal(), -opposite.local_normal());
            assert_eq!(opposite.opposite(), face);
        }
    }

    #[test]
    fn from_axis_round_trips() {
        for face in BoxFace::ALL {
            assert_eq!(BoxFace::from_axis(face.axis_index(), face.sign() > 0.0), face);
        }
    }
}
