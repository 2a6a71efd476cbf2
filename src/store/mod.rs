/// Store module
///
/// Client-side caches of item lists and the rules that keep them consistent
/// with mutation results: location resolution, response merging, the
/// location store/query cache pair, and per-item mutation serialization.

mod location;
mod merge;
mod item_store;
mod locks;

pub use location::*;
pub use merge::*;
pub use item_store::*;
pub use locks::*;
