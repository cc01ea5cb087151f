pub mod binop_registry;
pub mod draw;
pub mod mat;
pub mod registry;
