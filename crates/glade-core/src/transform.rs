//! Minimal placement fragment.

/// World placement of an entity: location, heading, uniform scale.
///
/// This is the slice of a full engine transform that the lifecycle core
/// and the representation pipeline actually consume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// World-space location.
    pub location: [f32; 3],
    /// Heading in radians around the vertical axis.
    pub yaw: f32,
    /// Uniform scale factor.
    pub scale: f32,
}

impl Transform {
    /// Origin placement with unit scale.
    pub const IDENTITY: Transform = Transform {
        location: [0.0; 3],
        yaw: 0.0,
        scale: 1.0,
    };

    /// A transform at the given location with default heading and scale.
    pub fn at(location: [f32; 3]) -> Self {
        Self {
            location,
            ..Self::IDENTITY
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
