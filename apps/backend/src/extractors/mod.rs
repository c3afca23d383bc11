pub mod current_player;
pub mod json_body;

pub use current_player::CurrentPlayer;
pub use json_body::JsonBody;
