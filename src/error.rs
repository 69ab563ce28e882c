use thiserror::Error;

/// Errors reported by the quadtree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuadtreeError {
    /// A coordinate was NaN or infinite. Such a point has no quadrant.
    #[error("invalid coordinate ({x}, {y}): coordinates must be finite")]
    InvalidCoordinate { x: f64, y: f64 },

    /// Bulk input that cannot be loaded as given.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Covering the point would push the extent past the range of f64.
    #[error("cannot cover ({x}, {y}): the extent would overflow")]
    ExtentOverflow { x: f64, y: f64 },
}

pub type Result<T> = std::result::Result<T, QuadtreeError>;
