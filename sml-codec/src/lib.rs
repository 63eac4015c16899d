//! SML (Smart Message Language) codec
//!
//! This crate turns the raw byte stream of a smart meter into readings:
//! frame extraction, CRC-16/X.25, the type-length-value node decoder,
//! scalar decoding and OBIS based reading extraction.
//!
//! # TODO
//!
//! ## 传输层帧
//! - [x] 起始/结束转义序列识别
//! - [x] 不完整帧保留, 噪声丢弃
//! - [x] CRC-16/X.25 计算和验证（可选强制）
//! - [ ] 填充字节 (fill count) 从 package 末尾剥离
//!
//! ## 节点解码
//! - [x] 列表 (0x7N) 递归解码和项数校验
//! - [x] 扩展长度元素 (0x8N)
//! - [x] 嵌套深度限制
//!
//! ## 读数提取
//! - [x] OBIS 码表（制造商、设备、电能、功率）
//! - [x] 有符号/无符号整数解码
//! - [ ] 按 SML unit/scaler 字段换算, 替代固定除数

pub mod crc;
pub mod extract;
pub mod frame;
pub mod node;
pub mod parser;
pub mod scalar;
pub mod statistics;

pub use sml_core::error;
pub use sml_core::{DecodeStep, ObisCode, Reading, SmlError, SmlResult};

pub use extract::{extract, ObisBinding, ReadingField, ValueRecord, OBIS_BINDINGS};
pub use frame::{extract_package, scan, FrameScan, SmlFrame, END_PREFIX, START_MARKER};
pub use node::{decode, Node, NodeDecoder};
pub use parser::{decode_package, ParserSettings, SmlParser};
pub use scalar::{decode_hex_string, decode_integer};
pub use statistics::ParserStatistics;
