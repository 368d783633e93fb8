//! Request middleware

pub mod prediction_log;
