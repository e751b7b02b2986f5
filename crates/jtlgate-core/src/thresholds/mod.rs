pub mod evaluator;
pub mod io;
pub mod model;
pub mod validation;
