// Core moderation module - composes the at-channel request notifications.
// Models, action tokens and the composer service live in separate files.

pub mod action_token;
pub mod moderation_models;
pub mod moderation_service;

pub use action_token::*;
pub use moderation_models::*;
pub use moderation_service::*;
