//! Scene (draw stream) types backing the host batch.
//!
//! Commands are recorded in submission order and consumed by the batch
//! renderers on flush.

mod cmd;
mod list;
mod rect;

pub use cmd::DrawCmd;
pub use list::DrawList;
pub use rect::RectCmd;
