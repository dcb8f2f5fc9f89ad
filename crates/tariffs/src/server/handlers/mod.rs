pub mod logs;
pub mod lookup;
pub mod semantic;
pub mod simulation;
pub mod status;
