//! Workflow modules. Admissions is the only one today; the module level
//! exists so sibling workflows keep the same shape.

pub mod admissions;
