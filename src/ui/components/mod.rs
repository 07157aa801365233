pub mod call_screen;
pub mod conversation;
pub mod inbox;
pub mod input_bar;
pub mod pickers;
