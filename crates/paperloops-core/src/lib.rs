mod assembler;
mod comparison;
mod completion;
mod context;
mod error;
mod loop_runner;
mod outcome;
mod outline;
mod persist;

pub use assembler::{AssemblyError, PaperAssembler};
pub use comparison::{BaselineResult, ComparisonDriver, ComparisonReport, ComparisonStats};
pub use completion::{CompletionPolicy, SubstringPolicy, DEFAULT_REQUIRED_SECTIONS};
pub use context::{IterationRecord, RecordKind, RunContext, DEFAULT_MAX_ITERATIONS};
pub use error::LoopError;
pub use loop_runner::LoopRunner;
pub use outcome::{PaperOutcome, RefinementOutcome, RunOutcome};
pub use outline::{OutlineError, OutlineTree, Section, Subsection};
pub use persist::{PersistError, PersistFailure, PersistReport, ResultWriter};
