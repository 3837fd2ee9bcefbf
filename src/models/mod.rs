pub mod event;

pub use event::{CreateEventRequest, CreatedEvent, Event};
