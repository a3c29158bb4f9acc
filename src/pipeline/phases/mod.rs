// Build pipeline phases
//
// Each phase reads and extends the shared BuildState; the orchestrator runs
// them in file-number order and stops at the first error.

#[path = "01_extract.rs"]
pub mod extract;
#[path = "02_assemble.rs"]
pub mod assemble;
#[path = "03_external.rs"]
pub mod external;
#[path = "04_graph.rs"]
pub mod graph;
#[path = "05_build_order.rs"]
pub mod build_order;

pub use assemble::AssemblePhase;
pub use build_order::{topological_sort, BuildOrderPhase};
pub use external::ExternalPhase;
pub use extract::{extract_file, ExtractPhase};
pub use graph::GraphPhase;
