//! 表依赖声明
//!
//! Each exportable table declares the tables it references. The restore
//! order is derived from those declarations once at startup, so adding a
//! table only means declaring its parents.

mod registry;
mod topo;

pub use registry::{TableRegistry, TableSpec, standard_specs};
pub use topo::topo_sort;
