pub mod attributes;
pub mod character;
pub mod item;
pub mod skills;
