//! Budget DocGen Common Library
//!
//! 预算账本、工作量清单与表单布局（不含任何文件 I/O）

pub mod types;
pub mod ledger;
pub mod worklist;
pub mod layout;
pub mod error;
pub mod export;

pub use types::{
    BaseInfo, BaseInfoKey, Category, ItemKey, LineItem, LineItemDraft, ProjectInfo,
};
pub use ledger::{ItemEdit, Ledger, LedgerTotals};
pub use worklist::format_work_list;
pub use layout::{CellGrid, FormLayout, Located, APPLICATION_FORM, REVIEW_FORM};
pub use error::{Error, Result};
