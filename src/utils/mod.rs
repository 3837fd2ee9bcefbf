pub mod deadline;
pub mod error;
pub mod response;
