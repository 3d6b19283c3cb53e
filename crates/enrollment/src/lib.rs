//! Enrollment resolution, task template propagation and the enroll flow.

#![warn(missing_docs)]

pub mod manager;
pub mod propagator;
pub mod resolver;

pub use manager::{BasicEnrollmentManager, EnrollmentManager};
pub use propagator::propagate_templates;
pub use resolver::{BasicEnrollmentResolver, EnrollmentResolver, Memberships};
