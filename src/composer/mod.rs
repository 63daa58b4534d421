mod allocator;
mod composer;

pub use allocator::StateAllocator;
pub use composer::Composer;
pub use composer::StateId;
pub use composer::Transition;
