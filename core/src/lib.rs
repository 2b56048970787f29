pub mod geometry;
pub mod kernel;
pub mod dice;
pub mod font;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
