//! Ready-made [`Primitive`](crate::primitive::Primitive) implementations.

mod aabb;
mod triangle;

pub use self::triangle::Triangle;
