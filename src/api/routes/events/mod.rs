pub mod db;
pub mod materialize;
pub mod public;
mod router;
pub use router::router;
