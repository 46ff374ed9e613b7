// Lookup pipeline: normalize → lookup/filter → aggregate + plan → report
pub mod normalize {
    pub use crate::normalize::*;
}

pub mod lookup {
    pub use crate::lookup::*;
}

pub mod aggregate {
    pub use crate::aggregate::*;
}

pub mod planner {
    pub use crate::planner::*;
}

pub mod report {
    pub use crate::report::*;
}

pub mod models {
    pub use crate::models::*;
}
