pub mod issues;
pub mod notifications;
