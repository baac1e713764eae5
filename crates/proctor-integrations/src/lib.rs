pub mod classifier;
pub mod http;
pub mod questions;

pub use classifier::HttpFrameClassifier;
pub use http::ResponseExt;
pub use questions::FileQuestionSupply;
