pub mod controller;
pub mod interpreter;
pub mod llm;
pub mod prompts;
pub mod providers;

pub use controller::{TurnController, TurnOutcome, TurnReport};
pub use interpreter::{interpret, Directive, Interpretation, ManifestError};
pub use llm::{GenerationClient, GenerationRequest, HistoryEntry, Role};
