pub mod circulation;

pub use circulation::{Circulation, MockCirculationError};
