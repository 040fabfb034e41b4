// Core traits, representation selection and the generated CRUD endpoints

pub mod crud_operations;
pub mod traits;
pub mod views;

pub use traits::{CRUDResource, MergeIntoActiveModel};
pub use views::{Action, Representation, View, WriteMode, render};
