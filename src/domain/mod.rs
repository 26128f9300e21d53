pub mod aggregate;
pub mod coco;
pub mod detection;
pub mod errors;
pub mod model;
pub mod scan;
pub mod theme;
