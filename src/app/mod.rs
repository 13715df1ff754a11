pub mod dispatch;

pub use dispatch::{build_session, dispatch, load_config};
