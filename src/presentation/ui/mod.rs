pub mod controller;
pub mod session_state;
pub mod view;

pub use controller::{PageInput, UiController};
pub use session_state::SessionStore;
pub use view::PageView;
