// PressureCare Domain
// This crate contains the business logic for the PressureCare hypertension
// monitoring program: reading classification, trend analysis, triage and
// workflow task management

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Injected time source
pub mod clock;

// Re-export the repository module from pressure_care_data for convenience
pub use pressure_care_data::repository;
