//! 本地数据文件（预算账本 / 基础信息）
//!
//! 两个文件都是整体读写的 JSON。读取失败时降级为空数据并返回警告，
//! 由调用方决定如何提示。

pub mod base_info;
pub mod ledger_store;

pub use base_info::{BaseInfoLoad, BaseInfoStore};
pub use ledger_store::{LedgerLoad, LedgerRecord, LedgerStore};
