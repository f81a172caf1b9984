mod preview;
mod release;

pub use preview::preview;
pub use release::release;
