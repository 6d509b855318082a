/// Persisted entities
///
/// # Models
///
/// - `id`: creation-ordered record identifiers
/// - `user`: registered users and their safe projections
/// - `animal`: animals and their owner reference
/// - `training_log`: training sessions linking an animal to its owner
///
/// Rows are read and written through the repository traits in [`crate::store`].

pub mod animal;
pub mod id;
pub mod training_log;
pub mod user;

pub use animal::{Animal, AnimalListing, NewAnimal};
pub use id::RecordId;
pub use training_log::{NewTrainingLog, TrainingLog, TrainingLogListing};
pub use user::{NewUser, User, UserProfile, UserSummary};
