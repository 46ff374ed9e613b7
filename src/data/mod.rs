//! Dataset loading and caching.

pub mod db {
    pub use crate::db::*;
}

pub mod loader {
    pub use crate::loader::*;
}

pub mod table_cache {
    pub use crate::table_cache::*;
}
