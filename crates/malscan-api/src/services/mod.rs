pub mod email;
pub mod scan_workflow;
