pub mod decoder;
pub mod detection;
pub mod errors;
pub mod labels;
pub mod model;
pub mod report;
pub mod tensor;
