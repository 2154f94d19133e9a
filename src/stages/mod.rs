//! Concrete pipeline stages and the external toolchain seam

pub mod assembly;
pub mod configure;
pub mod consensus;
pub mod finalize;
pub mod polish;
pub mod repeat;
pub mod toolchain;
pub mod trestle;

pub use assembly::AssemblyStage;
pub use configure::ConfigureStage;
pub use consensus::ConsensusStage;
pub use finalize::FinalizeStage;
pub use polish::PolishStage;
pub use repeat::RepeatStage;
pub use toolchain::{ContigStat, PolishSummary, SubprocessToolchain, Toolchain};
pub use trestle::TrestleStage;
