pub mod input_bar;
pub mod message_list;
pub mod notice;
pub mod status_bar;
pub mod voice_button;

pub use input_bar::InputBar;
pub use message_list::MessageList;
pub use notice::Notice;
pub use status_bar::{LinkStatus, StatusBar};
pub use voice_button::{VoiceButton, VoiceIntent};
