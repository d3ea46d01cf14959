pub mod insights;
pub mod multi;
pub mod pipeline;
pub mod route;

pub mod util;
