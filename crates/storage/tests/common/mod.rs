pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{populate, seeded_bytes};
