pub mod prelude;
pub mod point_quadtree;
pub mod bulk;
pub mod representation;

#[cfg(test)]
mod proptests;
