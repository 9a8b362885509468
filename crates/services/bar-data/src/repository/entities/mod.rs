//! SeaORM entities.

pub mod bar;
