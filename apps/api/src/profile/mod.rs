// Onboarding profile: validation, first-use creation, status and updates.

pub mod handlers;
pub mod service;
pub mod validation;
