pub mod auth;
pub mod guest;
pub mod health;
pub mod invitation;
pub mod song;
