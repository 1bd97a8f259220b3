//! Project domain: projects, tabs and capture inputs.

pub mod capture;
pub mod model;

pub use capture::{CaptureReport, ClassifiedTabs};
pub use model::{NewProject, NewTab, Project, ProjectUpdate, Section, Tab};
