use thiserror::Error;

use crate::AssemblyError;

/// Failure of one step of the loop; absorbed at the phase boundary
#[derive(Error, Debug)]
pub enum LoopError {
    #[error("Generation error: {0}")]
    Generation(#[from] paperloops_agent::GenerationError),

    #[error("Paper assembly error: {0}")]
    Assembly(#[from] AssemblyError),
}
