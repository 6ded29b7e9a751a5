// src/drivers/mod.rs
// 阻抗计算核心：数据集、阻抗、绘图数据、渲染、检测
pub mod dataset;
pub mod detection;
pub mod error;
pub mod impedance;
pub mod pipeline;
pub mod plot;
pub mod spectrum;
// 公开导出外部用到的类型
pub use dataset::AnalysisTable;
pub use error::EisError;
pub use pipeline::{AnalysisOutput, ImpedancePipeline};
pub use plot::{PlotStyle, PlotStyleConfig};
