/// Rejected sphere parameters. Raised before any allocation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("sphere resolution must be at least 2, got {0}")]
    ResolutionTooLow(u32),

    /// `resolution²` vertices would not be addressable with `u32` indices.
    #[error("sphere resolution {0} exceeds the 32-bit index range")]
    ResolutionTooHigh(u32),

    #[error("sphere radius must be finite and positive, got {0}")]
    InvalidRadius(f32),
}
