pub mod generalization;
pub mod maintenance;
pub mod scoring;
pub mod transition;

pub use generalization::{
    current_grid, submit_generalization_probe, GeneralizationGrid, GeneralizationOutcome,
    GeneralizationSubmission, GridCell,
};
pub use maintenance::{
    evaluate_maintenance_probe, schedule_maintenance_probes, MaintenanceEvaluation,
    MaintenanceOutcome,
};
pub use scoring::score_protocol;
pub use transition::{transition_protocol, transition_protocol_label};
