//! External collaborators: flashcard catalog and event bus

pub mod catalog;
pub mod events;
