//! 应用数据流模型
//!
//! 模块与带类型的边组成的静态图，以及按 (模块, 输入类型) 查找的元组映射，
//! 决定模块完成时产生哪些输出。

mod application;
mod edge;
mod selectivity;
mod tuple;

pub use application::{AppLoop, AppModule, Application, TupleMapping};
pub use edge::{AppEdge, EdgeKind, direction};
pub use selectivity::{CustomSelectivity, Selectivity};
pub use tuple::{Tuple, TupleId};
