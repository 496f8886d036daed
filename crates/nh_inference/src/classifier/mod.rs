pub mod zero_shot;

pub use zero_shot::HfZeroShotClassifier;
