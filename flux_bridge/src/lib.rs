pub mod bridge;
pub mod codec;
pub mod conduit;
pub mod flux;
pub mod registry;
