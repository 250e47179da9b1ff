use thiserror::Error;

/// Errors detected while validating or freezing a scene.
///
/// These are the only faults the renderer surfaces as `Err`: they are
/// structural, found before any worker starts, and the render is never
/// begun. Per-ray numeric trouble (degenerate geometry, NaN solves) is
/// contained at the intersection routines as "no hit" instead.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("scene has {count} primitives, exceeding the limit of {limit}")]
    TooManyPrimitives { count: usize, limit: usize },

    #[error("solid {solid} references material {material}, but the scene has {count} materials")]
    UnknownMaterial {
        solid: usize,
        material: usize,
        count: usize,
    },

    #[error("mesh solid {solid} indexes vertex {index}, but it has only {count} vertices")]
    MeshIndexOutOfBounds {
        solid: usize,
        index: u32,
        count: usize,
    },
}

pub type BuildResult<T> = Result<T, BuildError>;
