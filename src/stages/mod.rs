pub mod stage0_load;
pub mod stage1_normalize;
pub mod stage2_join;
pub mod stage3_render;

pub use stage0_load::*;
pub use stage1_normalize::*;
pub use stage2_join::*;
pub use stage3_render::*;
